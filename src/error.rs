//! Error types for input validation and service calls.
//!
//! Every error here ends up as an inline message for the user; none of them
//! is fatal to the process.

use serde_json::Value;
use thiserror::Error;

/// Shown when the service failed without a usable `detail`.
pub const FALLBACK_MESSAGE: &str = "An error occurred while contacting the API.";

/// Input rejected locally, before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter some text to analyze")]
    EmptyText,

    #[error("Please enter a Reddit post URL")]
    EmptyUrl,

    #[error("Text is too long ({len} characters, maximum is {max})")]
    TooLong { len: usize, max: usize },

    #[error("Batch requests need at least one text")]
    EmptyBatch,

    #[error("Batch requests accept at most {max} texts, got {count}")]
    BatchTooLarge { count: usize, max: usize },

    #[error("Batch item {index} is empty")]
    EmptyBatchItem { index: usize },
}

/// Failure talking to the analysis service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("Cannot connect to the analysis service at {url}")]
    Connect { url: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Message shown to the user: the service's own detail when it sent
    /// one, the generic fallback otherwise.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }

    /// Build an API error from a non-2xx response body.
    pub fn from_body(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| extract_detail(&json));
        ServiceError::Api { status, detail }
    }
}

/// Pull a human-readable message out of a `{ "detail": ... }` body.
///
/// `detail` is either a plain string or, for request validation failures, a
/// list of `{ "msg": ... }` objects whose messages get joined.
fn extract_detail(json: &Value) -> Option<String> {
    match json.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

/// Why a submission did not produce a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("A request is already in flight")]
    Busy,

    #[error(transparent)]
    Input(#[from] InputError),
}
