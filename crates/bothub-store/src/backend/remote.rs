//! Remote cache over a Redis REST endpoint (Upstash protocol)
//!
//! Commands are POSTed as a JSON array with a bearer token, and replies come
//! back as `{"result": ...}` or `{"error": "..."}`. The document lives under
//! one key and expires a day after the last write.

use super::{BackendKind, SnapshotBackend};
use crate::config::RemoteConfig;
use crate::error::{PersistenceError, PersistenceResult};
use async_trait::async_trait;
use bothub_types::Document;
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Key the whole document is stored under
pub const CACHE_KEY: &str = "bothub_db";

/// Expiry re-applied on every write
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RemoteCache {
    http: ReqwestClient,
    url: String,
    token: String,
}

impl RemoteCache {
    pub fn new(config: &RemoteConfig) -> PersistenceResult<Self> {
        let http = ReqwestClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Build a client and check the endpoint answers `PING`
    pub async fn connect(config: &RemoteConfig) -> PersistenceResult<Self> {
        let cache = Self::new(config)?;
        cache.ping().await?;
        Ok(cache)
    }

    pub async fn ping(&self) -> PersistenceResult<()> {
        match self.command(&["PING"]).await? {
            Value::String(s) if s == "PONG" => Ok(()),
            other => Err(PersistenceError::Remote(format!(
                "Unexpected PING reply: {}",
                other
            ))),
        }
    }

    async fn command(&self, args: &[&str]) -> PersistenceResult<Value> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_reply(status, &body)
    }
}

/// Pull `result` out of a REST reply, turning `error` replies and bad
/// statuses into errors
fn parse_reply(status: reqwest::StatusCode, body: &str) -> PersistenceResult<Value> {
    let reply: Value = serde_json::from_str(body).unwrap_or_default();

    if let Some(error) = reply.get("error").and_then(Value::as_str) {
        return Err(PersistenceError::Remote(error.to_string()));
    }
    if !status.is_success() {
        return Err(PersistenceError::Remote(format!("HTTP {}", status)));
    }

    match reply {
        Value::Object(mut map) => map
            .remove("result")
            .ok_or_else(|| PersistenceError::Remote("Reply has no result".to_string())),
        _ => Err(PersistenceError::Remote("Malformed reply".to_string())),
    }
}

/// The stored value is normally a JSON string, but accept an inline object too
fn decode_document(value: Value) -> PersistenceResult<Option<Document>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(serde_json::from_str(&s)?)),
        other => Ok(Some(serde_json::from_value(other)?)),
    }
}

#[async_trait]
impl SnapshotBackend for RemoteCache {
    fn kind(&self) -> BackendKind {
        BackendKind::RemoteCache
    }

    async fn load(&self) -> PersistenceResult<Option<Document>> {
        let value = self.command(&["GET", CACHE_KEY]).await?;
        decode_document(value)
    }

    async fn save(&self, doc: &Document) -> PersistenceResult<()> {
        let data = serde_json::to_string(doc)?;
        let ttl = CACHE_TTL.as_secs().to_string();
        self.command(&["SET", CACHE_KEY, &data, "EX", &ttl]).await?;
        debug!("Wrote {} bytes to remote key {}", data.len(), CACHE_KEY);
        Ok(())
    }
}
