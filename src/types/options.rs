//! Per-request fetch options

use serde::{Deserialize, Serialize};

/// Default number of items per page (and ids per vectored batch).
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Options for a single fetch (or every page of a `fetch_all`).
///
/// Client-wide settings (site, key) live on the client; these override or
/// add to them per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Named response filter id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Page size; falls back to the client default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }
}
