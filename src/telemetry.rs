//! Telemetry metric name constants.
//!
//! Centralised metric names for huginn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `bucket`: backoff bucket of the endpoint path (e.g. "/users/{ids}")
//! - `status`: outcome: "ok", "api_error" or "error"

/// Total API requests issued.
///
/// Labels: `bucket`, `status` ("ok" | "api_error" | "error").
pub const REQUESTS_TOTAL: &str = "huginn_requests_total";

/// Time spent waiting on a server-advised backoff, in seconds.
///
/// Only recorded when a wait actually happened. Labels: `bucket`.
pub const BACKOFF_WAIT_SECONDS: &str = "huginn_backoff_wait_seconds";

/// Total user cache hits.
pub const CACHE_HITS_TOTAL: &str = "huginn_cache_hits_total";

/// Total user cache misses.
pub const CACHE_MISSES_TOTAL: &str = "huginn_cache_misses_total";

/// Total placeholder users synthesized for ids the API did not return.
pub const MISSING_USERS_TOTAL: &str = "huginn_missing_users_total";
