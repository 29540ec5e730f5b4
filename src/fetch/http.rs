//! Snapshot acquisition over HTTP

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use crate::error::FetchError;

/// User-Agent sent with every snapshot request. Some webcam hosts refuse
/// clients that do not look like a browser.
const SNAPSHOT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetches the current still image from a source URL.
///
/// Abstracted so workers can be driven by a mock in tests.
pub trait SnapshotFetcher: Send + Sync {
    /// Fetch the snapshot body at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}

/// Production fetcher backed by `reqwest`.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(SNAPSHOT_USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl SnapshotFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        tracing::trace!(url = url, "Snapshot request starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(
                url = url,
                error = %e,
                is_timeout = e.is_timeout(),
                is_connect = e.is_connect(),
                "Snapshot request failed"
            );
            FetchError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = url, status = status.as_u16(), "Snapshot request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        tracing::trace!(url = url, bytes = body.len(), "Snapshot received");
        Ok(body)
    }
}
