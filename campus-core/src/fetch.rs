//! Outbound HTTP for upstream campus pages and feeds.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{CampusError, CampusResult};

const USER_AGENT: &str = concat!("campus-assistant/", env!("CARGO_PKG_VERSION"));

/// Retrieves a remote document.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET `url` and return the body. Non-2xx responses are errors.
    async fn fetch(&self, url: &str) -> CampusResult<Bytes>;
}

/// [`Fetch`] backed by a shared `reqwest::Client`.
///
/// Built once at startup; clones share the connection pool.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client whose requests fail after `timeout`.
    pub fn new(timeout: Duration) -> CampusResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CampusError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> CampusResult<Bytes> {
        tracing::debug!(%url, "fetching upstream");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CampusError::upstream(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CampusError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| CampusError::upstream(url, e))
    }
}
