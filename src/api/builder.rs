//! Builder for configuring client instances

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use super::transport::{DEFAULT_TIMEOUT, HttpTransport, Transport};
use super::{BackoffScheduler, Inner, StackExchangeApi};
use crate::config::ApiConfig;
use crate::types::DEFAULT_PAGE_SIZE;
use crate::{HuginnError, Result};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.stackexchange.com/2.3";

/// Builder for [`StackExchangeApi`].
///
/// ```rust
/// # use huginn::StackExchangeApi;
/// let api = StackExchangeApi::builder()
///     .site("stackoverflow")
///     .api_key("your-app-key((")
///     .page_size(50)
///     .build()
///     .unwrap();
/// assert_eq!(api.page_size(), 50);
/// ```
pub struct StackExchangeApiBuilder {
    base_url: String,
    site: Option<String>,
    api_key: Option<String>,
    page_size: usize,
    timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for StackExchangeApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StackExchangeApiBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            site: None,
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            transport: None,
        }
    }

    /// Start from the `[api]` section of a config file.
    pub fn from_config(config: &ApiConfig) -> Self {
        let mut builder = Self::new()
            .base_url(config.base_url.clone())
            .page_size(config.page_size)
            .timeout(Duration::from_secs(config.timeout_secs));
        if let Some(site) = &config.site {
            builder = builder.site(site.clone());
        }
        if let Some(key) = &config.key {
            builder = builder.api_key(key.clone());
        }
        builder
    }

    /// Site id (`stackoverflow`, `meta`, `superuser`, ...). Required.
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Site id derived from a site host name; see
    /// [`site_id_from_host`](super::site_id_from_host).
    pub fn site_from_host(self, host: &str) -> Self {
        self.site(super::site_id_from_host(host))
    }

    /// Application key, for the higher request quota.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the API root (for testing with wiremock).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Default page size and vectored batch size (default: 100).
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Per-request timeout for the default HTTP transport (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom transport instead of `reqwest`.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<StackExchangeApi> {
        let site = self
            .site
            .filter(|s| !s.is_empty())
            .ok_or_else(|| HuginnError::Configuration("no site configured".into()))?;
        if self.page_size == 0 {
            return Err(HuginnError::Configuration(
                "page size must be at least 1".into(),
            ));
        }
        let base_url = Url::parse(&self.base_url).map_err(|e| {
            HuginnError::Configuration(format!("invalid base URL {}: {e}", self.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(HuginnError::Configuration(format!(
                "base URL cannot have a path: {base_url}"
            )));
        }
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.timeout)?),
        };

        Ok(StackExchangeApi {
            inner: Arc::new(Inner {
                base_url,
                site,
                api_key: self.api_key,
                page_size: self.page_size,
                transport,
                scheduler: BackoffScheduler::new(),
            }),
        })
    }
}
