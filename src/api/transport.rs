//! HTTP transport seam.
//!
//! The client only needs "GET this URL, give me the body". Keeping that
//! behind a trait lets tests (and embedders with their own HTTP stack)
//! swap the network out without touching scheduling or decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::warn;

use crate::{HuginnError, Result};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can fetch a URL and return the response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` and return the body as text.
    ///
    /// Implementations return the body for non-2xx statuses too; the API
    /// reports its errors inside the JSON envelope.
    async fn get(&self, url: &Url) -> Result<String>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Create a transport with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(concat!("huginn/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HuginnError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<String> {
        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "API request failed");
            HuginnError::Http(e.to_string())
        })?;
        let status = response.status();
        response.text().await.map_err(|e| {
            warn!(url = %url, status = %status, error = %e, "failed to read API response body");
            HuginnError::Http(format!("failed to read response body (HTTP {status}): {e}"))
        })
    }
}
