//! Huginn error types

/// Huginn error types
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    // Request construction errors
    #[error("missing path parameters: {path}")]
    MissingPathParameter { path: String },

    #[error("cannot batch multiple path parameters: {}", .0.join(", "))]
    MultipleBatchParameters(Vec<String>),

    // Upstream errors
    /// Error envelope returned by the API (`error_id` present).
    #[error("{error_name} ({error_id}): {error_message}")]
    Api {
        error_id: i64,
        error_name: String,
        error_message: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl HuginnError {
    /// Whether the error is worth retrying later.
    ///
    /// Transport failures are transient, as are the API's
    /// `internal_error` (500), `throttle_violation` (502) and
    /// `temporarily_unavailable` (503) envelopes. Nothing in this crate
    /// retries on its own; this is for callers that want to.
    pub fn is_transient(&self) -> bool {
        match self {
            HuginnError::Http(_) => true,
            HuginnError::Api { error_id, .. } => matches!(error_id, 500 | 502 | 503),
            _ => false,
        }
    }

    /// The API `error_id`, if this error came from an error envelope.
    pub fn api_error_id(&self) -> Option<i64> {
        match self {
            HuginnError::Api { error_id, .. } => Some(*error_id),
            _ => None,
        }
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
