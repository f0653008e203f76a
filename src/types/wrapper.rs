//! The common response wrapper every API method returns.
//!
//! On the wire the wrapper is a flat object; success and failure are told
//! apart by the presence of `error_id`. [`ApiWrapper::decode`] turns that
//! into an explicit [`WrapperBody`] so callers match on a variant instead of
//! probing fields.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{HuginnError, Result};

/// Error envelope contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub error_id: i64,
    pub error_name: String,
    pub error_message: String,
}

impl From<ApiErrorBody> for HuginnError {
    fn from(body: ApiErrorBody) -> Self {
        HuginnError::Api {
            error_id: body.error_id,
            error_name: body.error_name,
            error_message: body.error_message,
        }
    }
}

/// Success or failure payload of a wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum WrapperBody<T> {
    Items { items: Vec<T>, has_more: bool },
    Error(ApiErrorBody),
}

/// A decoded response wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiWrapper<T> {
    /// Server-advised delay before the next call to the same method.
    pub backoff: Option<Duration>,
    pub body: WrapperBody<T>,
}

#[derive(Deserialize)]
struct RawWrapper<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    backoff: Option<u64>,
    #[serde(default)]
    error_id: Option<i64>,
    #[serde(default)]
    error_name: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

impl<T: DeserializeOwned> ApiWrapper<T> {
    /// Decode a response body.
    ///
    /// A body with `error_id` must also carry `error_name` and
    /// `error_message`; anything else is a [`HuginnError::Decode`].
    pub fn decode(body: &str) -> Result<Self> {
        let raw: RawWrapper<T> = serde_json::from_str(body)?;
        let backoff = raw.backoff.map(Duration::from_secs);
        let body = match raw.error_id {
            Some(error_id) => {
                let (Some(error_name), Some(error_message)) = (raw.error_name, raw.error_message)
                else {
                    return Err(HuginnError::Decode(format!(
                        "error envelope {error_id} without name or message"
                    )));
                };
                WrapperBody::Error(ApiErrorBody {
                    error_id,
                    error_name,
                    error_message,
                })
            }
            None => WrapperBody::Items {
                items: raw.items,
                has_more: raw.has_more,
            },
        };
        Ok(Self { backoff, body })
    }
}

impl<T> ApiWrapper<T> {
    /// Unwrap into `(items, has_more)`, turning an error envelope into
    /// [`HuginnError::Api`].
    pub fn into_page(self) -> Result<(Vec<T>, bool)> {
        match self.body {
            WrapperBody::Items { items, has_more } => Ok((items, has_more)),
            WrapperBody::Error(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn decodes_items_and_paging() {
        let wrapper: ApiWrapper<u32> =
            ApiWrapper::decode(r#"{"items": [1, 2], "has_more": true, "quota_max": 300}"#).unwrap();
        assert_eq!(wrapper.backoff, None);
        assert_eq!(
            wrapper.body,
            WrapperBody::Items {
                items: vec![1, 2],
                has_more: true
            }
        );
    }

    #[test]
    fn missing_items_means_empty_page() {
        let wrapper: ApiWrapper<Value> = ApiWrapper::decode("{}").unwrap();
        assert_eq!(wrapper.into_page().unwrap(), (vec![], false));
    }

    #[test]
    fn backoff_is_in_seconds() {
        let wrapper: ApiWrapper<Value> =
            ApiWrapper::decode(r#"{"items": [], "backoff": 42}"#).unwrap();
        assert_eq!(wrapper.backoff, Some(Duration::from_secs(42)));
    }

    #[test]
    fn error_id_selects_error_variant() {
        let wrapper: ApiWrapper<Value> = ApiWrapper::decode(
            r#"{"error_id": 502, "error_name": "throttle_violation", "error_message": "too many requests from this IP"}"#,
        )
        .unwrap();
        let err = wrapper.into_page().unwrap_err();
        assert_eq!(
            err.to_string(),
            "throttle_violation (502): too many requests from this IP"
        );
        assert!(err.is_transient());
    }

    #[test]
    fn incomplete_error_envelope_is_rejected() {
        let result: Result<ApiWrapper<Value>> = ApiWrapper::decode(r#"{"error_id": 400}"#);
        assert!(matches!(result, Err(HuginnError::Decode(_))));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let result: Result<ApiWrapper<Value>> = ApiWrapper::decode("<html>");
        assert!(matches!(result, Err(HuginnError::Json(_))));
    }
}
