use serde_json::Value;
use thiserror::Error;

/// Errors surfaced to the operator by account and paging requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Transport-level failure, no HTTP response was received
    #[error("{0}")]
    Network(String),
    /// Server answered with a non-2xx status
    #[error("{0}")]
    Request(String),
    /// Server answered 2xx but the body had an unexpected shape
    #[error("{0}")]
    InvalidResponse(String),
    /// Operator input rejected locally, never sent to the network
    #[error("{0}")]
    Validation(String),
}

impl AppError {
    pub fn invalid_response() -> Self {
        AppError::InvalidResponse(INVALID_RESPONSE.to_string())
    }
}

pub const INVALID_RESPONSE: &str = "Invalid response from server";

/// Pull a human readable message out of a JSON error body.
///
/// Prefers a string `error` field, then a string `message` field.
pub fn extract_error_message(body: Option<&Value>) -> Option<String> {
    let obj = body?.as_object()?;
    ["error", "message"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Same as [`extract_error_message`] but falls back to `fallback`
pub fn error_message_or(body: Option<&Value>, fallback: &str) -> String {
    extract_error_message(body).unwrap_or_else(|| fallback.to_string())
}
