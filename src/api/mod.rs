//! Stack Exchange API client.
//!
//! [`StackExchangeApi`] composes URL construction ([`url`]), per-method
//! backoff scheduling ([`backoff`]), the HTTP [`transport`] and wrapper
//! decoding into two operations:
//!
//! - [`fetch`](StackExchangeApi::fetch): one request, returns its items.
//! - [`fetch_all`](StackExchangeApi::fetch_all): a lazy stream over every
//!   page, splitting a vectored path parameter into page-sized batches.
//!
//! The client is cheap to clone; clones share the backoff state, so one
//! client per process (or per API key) is what keeps a caller inside the
//! rate limit.
//!
//! ```rust,no_run
//! use huginn::{FetchOptions, Parameters, StackExchangeApi};
//!
//! # async fn example() -> huginn::Result<()> {
//! let api = StackExchangeApi::builder().site("stackoverflow").build()?;
//! let users: Vec<serde_json::Value> = api
//!     .fetch("/users/{ids}", &Parameters::new().with("ids", vec![1u64, 3]), &FetchOptions::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod backoff;
mod builder;
mod pages;
pub mod transport;
pub mod url;

use std::cmp::Ordering;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::Stream;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

pub use backoff::{BackoffPermit, BackoffScheduler};
pub use builder::{DEFAULT_BASE_URL, StackExchangeApiBuilder};
pub use transport::{HttpTransport, Transport};
pub use url::{QueryOptions, backoff_bucket, build_url, path_placeholders, site_id_from_host};

use self::pages::PageCursor;
use crate::config::ApiConfig;
use crate::telemetry;
use crate::types::{ApiWrapper, FetchOptions, Parameters, WrapperBody};
use crate::{HuginnError, Result};

/// Lazy, single-pass stream of items produced by
/// [`fetch_all`](StackExchangeApi::fetch_all).
pub type ItemStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

struct Inner {
    base_url: Url,
    site: String,
    api_key: Option<String>,
    page_size: usize,
    transport: Arc<dyn Transport>,
    scheduler: BackoffScheduler,
}

/// Rate-limited Stack Exchange API client.
#[derive(Clone)]
pub struct StackExchangeApi {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for StackExchangeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackExchangeApi")
            .field("base_url", &self.inner.base_url.as_str())
            .field("site", &self.inner.site)
            .field("page_size", &self.inner.page_size)
            .finish_non_exhaustive()
    }
}

impl StackExchangeApi {
    /// Create a new builder for configuring the client.
    pub fn builder() -> StackExchangeApiBuilder {
        StackExchangeApiBuilder::new()
    }

    /// Build a client from the `[api]` section of a config file.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        StackExchangeApiBuilder::from_config(config).build()
    }

    /// Site id sent with every request.
    pub fn site(&self) -> &str {
        &self.inner.site
    }

    /// Default page size (and vectored batch size).
    pub fn page_size(&self) -> usize {
        self.inner.page_size
    }

    /// Page size for one call: the per-call override or the client default,
    /// never below 1.
    pub(crate) fn effective_page_size(&self, options: &FetchOptions) -> usize {
        options.page_size.unwrap_or(self.inner.page_size).max(1)
    }

    /// The shared backoff state.
    pub fn scheduler(&self) -> &BackoffScheduler {
        &self.inner.scheduler
    }

    /// Fetch a single page and return its items.
    ///
    /// Errors: [`HuginnError::MissingPathParameter`] before anything is
    /// sent, [`HuginnError::Api`] for an error envelope, and
    /// `Http`/`Json`/`Decode` for transport or decoding failures.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        parameters: &Parameters,
        options: &FetchOptions,
    ) -> Result<Vec<T>> {
        self.fetch_page(path, parameters, options)
            .await
            .map(|(items, _)| items)
    }

    /// Fetch every page of `path`, lazily.
    ///
    /// When exactly one vector parameter fills a path placeholder, it is
    /// split into batches of the page size and each batch is fetched in
    /// turn; within a batch, `has_more` pages are followed with an
    /// increasing `page` parameter. Requests are only issued as the stream
    /// is polled, strictly one after the other.
    ///
    /// Errors (including construction errors such as a missing path
    /// parameter or [`HuginnError::MultipleBatchParameters`]) surface as
    /// the stream's first item, and end the stream.
    pub fn fetch_all<T>(
        &self,
        path: impl Into<String>,
        parameters: Parameters,
        options: FetchOptions,
    ) -> ItemStream<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        PageCursor::new(self.clone(), path.into(), parameters, options, None).into_stream()
    }

    /// Like [`fetch_all`](Self::fetch_all), sorting each page with
    /// `compare` before yielding it.
    ///
    /// Sorting is per page, not across pages or batches. This is how a
    /// caller restores its requested id order, which the API does not
    /// preserve.
    pub fn fetch_all_by<T, F>(
        &self,
        path: impl Into<String>,
        parameters: Parameters,
        options: FetchOptions,
        compare: F,
    ) -> ItemStream<T>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnMut(&T, &T) -> Ordering + Send + 'static,
    {
        PageCursor::new(
            self.clone(),
            path.into(),
            parameters,
            options,
            Some(Box::new(compare)),
        )
        .into_stream()
    }

    /// Fetch one page and return `(items, has_more)`.
    pub(crate) async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        parameters: &Parameters,
        options: &FetchOptions,
    ) -> Result<(Vec<T>, bool)> {
        let url = build_url(
            &self.inner.base_url,
            path,
            parameters,
            &QueryOptions {
                site: &self.inner.site,
                api_key: self.inner.api_key.as_deref(),
                filter: options.filter.as_deref(),
                page_size: self.effective_page_size(options),
            },
        )?;

        let permit = self.inner.scheduler.acquire(path).await;
        let bucket = permit.bucket().to_string();
        debug!(url = %url, bucket = %bucket, "API request");

        let wrapper = match self.request::<T>(&url).await {
            Ok(wrapper) => wrapper,
            Err(e) => {
                // releases the gate with no delay
                drop(permit);
                metrics::counter!(telemetry::REQUESTS_TOTAL, "bucket" => bucket, "status" => "error")
                    .increment(1);
                return Err(e);
            }
        };
        permit.complete(wrapper.backoff);

        let status = match wrapper.body {
            WrapperBody::Items { .. } => "ok",
            WrapperBody::Error(_) => "api_error",
        };
        metrics::counter!(telemetry::REQUESTS_TOTAL, "bucket" => bucket, "status" => status)
            .increment(1);
        wrapper.into_page()
    }

    async fn request<T: DeserializeOwned>(&self, url: &Url) -> Result<ApiWrapper<T>> {
        let body = self.inner.transport.get(url).await?;
        ApiWrapper::decode(&body).map_err(|e| match e {
            HuginnError::Json(e) => HuginnError::Decode(format!("invalid response JSON: {e}")),
            other => other,
        })
    }
}
