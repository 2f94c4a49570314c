// src/lib.rs
pub mod assets;
pub mod browser;
pub mod config;
pub mod filter_panel;
pub mod handlers;
pub mod models;
pub mod news;
pub mod render;
pub mod storage;
pub mod utils;
