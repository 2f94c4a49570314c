// src/handlers/news.rs
use actix_web::{web, HttpResponse};
use log::error;
use serde::Deserialize;
use serde_json::Value;

use crate::news::NewsStore;
use crate::utils::GatewayError;

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    id: Option<String>,
}

/// Post summaries, or one post's raw markdown when `id` is given.
pub async fn get_news(
    store: web::Data<NewsStore>,
    query: web::Query<NewsQuery>,
) -> Result<HttpResponse, GatewayError> {
    let store = store.get_ref().clone();
    let body = match query.into_inner().id {
        Some(id) => web::block(move || store.get_raw(&id)).await,
        None => web::block(move || store.list_raw().map(Value::Array)).await,
    }
    .map_err(|e| {
        error!("News worker failed: {}", e);
        GatewayError::Content(e.to_string())
    })??;

    Ok(HttpResponse::Ok().json(body))
}
