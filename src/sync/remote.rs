//! Remote endpoint abstraction and the HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::Quote;
use crate::error::{QsError, Result};

use super::config::{PayloadFormat, RemoteConfig};

/// Category assigned to quotes mapped from the `posts` payload.
pub const SERVER_CATEGORY: &str = "Server";

/// Full quote list plus the server's modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSnapshot {
    pub quotes: Vec<Quote>,
    pub last_modified: DateTime<Utc>,
}

/// Source of server snapshots and sink for local pushes.
#[async_trait]
pub trait RemoteEndpoint: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<RemoteSnapshot>;

    async fn push_snapshot(&self, quotes: &[Quote]) -> Result<()>;

    /// Human-readable target, for logs and status output.
    fn describe(&self) -> String;
}

#[derive(Serialize)]
struct PushBody<'a> {
    quotes: &'a [Quote],
}

#[derive(Deserialize)]
struct PostItem {
    title: String,
}

/// JSON-over-HTTP remote.
pub struct HttpRemote {
    url: String,
    push_url: String,
    format: PayloadFormat,
    http_client: reqwest::Client,
}

impl HttpRemote {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let url = config.require_url()?.to_string();
        let push_url = config.push_target()?.to_string();
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| QsError::Config(format!("HTTP client error: {e}")))?;

        Ok(Self {
            url,
            push_url,
            format: config.format,
            http_client,
        })
    }

    fn request_id() -> String {
        format!(
            "qs-{}",
            Uuid::new_v4().to_string().split('-').next().unwrap_or("0")
        )
    }
}

#[async_trait]
impl RemoteEndpoint for HttpRemote {
    async fn fetch_snapshot(&self) -> Result<RemoteSnapshot> {
        let request_id = Self::request_id();
        debug!(request_id = %request_id, url = %self.url, "fetching remote snapshot");

        let response = self
            .http_client
            .get(&self.url)
            .header("Accept", "application/json")
            .header("X-Request-ID", &request_id)
            .send()
            .await
            .map_err(|e| unavailable("fetch", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QsError::RemoteUnavailable(format!(
                "fetch returned HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| unavailable("read response", &e))?;

        let snapshot = parse_snapshot(&body, self.format, Utc::now())?;
        info!(
            request_id = %request_id,
            quotes = snapshot.quotes.len(),
            last_modified = %snapshot.last_modified,
            "remote snapshot fetched"
        );
        Ok(snapshot)
    }

    async fn push_snapshot(&self, quotes: &[Quote]) -> Result<()> {
        let request_id = Self::request_id();
        let response = self
            .http_client
            .post(&self.push_url)
            .header("X-Request-ID", &request_id)
            .json(&PushBody { quotes })
            .send()
            .await
            .map_err(|e| unavailable("push", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QsError::RemoteUnavailable(format!(
                "push returned HTTP {status}"
            )));
        }
        debug!(request_id = %request_id, quotes = quotes.len(), "pushed local quotes");
        Ok(())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

fn unavailable(action: &str, err: &reqwest::Error) -> QsError {
    if err.is_timeout() {
        QsError::RemoteUnavailable(format!("{action} timed out: {err}"))
    } else {
        QsError::RemoteUnavailable(format!("{action} failed: {err}"))
    }
}

/// Parse a fetch response body.
///
/// `fetched_at` stands in for the server timestamp when the payload format
/// carries none.
pub fn parse_snapshot(
    body: &str,
    format: PayloadFormat,
    fetched_at: DateTime<Utc>,
) -> Result<RemoteSnapshot> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| QsError::MalformedRemoteData(format!("response is not JSON: {e}")))?;

    match format {
        PayloadFormat::Snapshot => {
            let snapshot: RemoteSnapshot = serde_json::from_value(value)
                .map_err(|e| QsError::MalformedRemoteData(format!("invalid snapshot: {e}")))?;
            for (idx, quote) in snapshot.quotes.iter().enumerate() {
                quote.validate().map_err(|e| {
                    QsError::MalformedRemoteData(format!("quote {idx}: {e}"))
                })?;
            }
            Ok(snapshot)
        }
        PayloadFormat::Posts => {
            let posts: Vec<PostItem> = serde_json::from_value(value)
                .map_err(|e| QsError::MalformedRemoteData(format!("invalid posts list: {e}")))?;
            let quotes = posts
                .into_iter()
                .filter_map(|post| Quote::new(post.title, SERVER_CATEGORY).ok())
                .collect();
            Ok(RemoteSnapshot {
                quotes,
                last_modified: fetched_at,
            })
        }
    }
}
