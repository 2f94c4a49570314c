use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::browser::state::Message;
use crate::models::server::Server;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed server list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server list is neither an array nor an object")]
    Shape,
}

/// Anything that can produce one snapshot of the server list.
pub trait ServerSource {
    fn fetch_servers(&self) -> impl Future<Output = Result<Vec<Server>, FetchError>> + Send;
}

/// Fetches the aggregator's full list over HTTP.
#[derive(Debug, Clone)]
pub struct HttpServerSource {
    client: reqwest::Client,
    url: String,
}

impl HttpServerSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl ServerSource for HttpServerSource {
    async fn fetch_servers(&self) -> Result<Vec<Server>, FetchError> {
        debug!("Fetching server list from {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.bytes().await?;
        parse_servers(&body)
    }
}

pub fn parse_servers(body: &[u8]) -> Result<Vec<Server>, FetchError> {
    let value: Value = serde_json::from_slice(body)?;
    normalize_servers(value)
}

/// Accepts either a JSON array of servers or an object whose values are
/// servers, keeping wire order. Records that cannot be read at all are
/// skipped with a warning.
pub fn normalize_servers(value: Value) -> Result<Vec<Server>, FetchError> {
    let records: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => return Err(FetchError::Shape),
    };

    let total = records.len();
    let servers: Vec<Server> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Server>(record) {
            Ok(server) => Some(server),
            Err(e) => {
                warn!("Skipping unreadable server record: {}", e);
                None
            }
        })
        .collect();

    debug!("Normalized {} of {} server records", servers.len(), total);
    Ok(servers)
}

/// Runs one fetch in the background and reports it as `FetchCompleted`.
/// A receiver that has gone away by then is not an error.
pub fn spawn_fetch<S>(source: Arc<S>, tx: mpsc::UnboundedSender<Message>) -> JoinHandle<()>
where
    S: ServerSource + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let result = source.fetch_servers().await;
        if tx.send(Message::FetchCompleted(result)).is_err() {
            debug!("Server list was dropped before the fetch completed");
        }
    })
}
