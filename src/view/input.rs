//! Input validation.
//!
//! Validation never mutates the input buffer; it only decides whether a
//! request may be built from it.

use crate::cli::MAX_BATCH_SIZE;
use crate::error::InputError;
use crate::models::{AnalysisRequest, InputMode};
use tracing::warn;

/// Build the request for `input` in the given mode.
pub fn build_request(
    mode: InputMode,
    input: &str,
    max_text_chars: usize,
) -> Result<AnalysisRequest, InputError> {
    match mode {
        InputMode::Url => validate_url(input).map(|post_url| AnalysisRequest::Post { post_url }),
        InputMode::Text => {
            validate_text(input, max_text_chars).map(|text| AnalysisRequest::Text { text })
        }
    }
}

/// Trimmed text, if non-empty and within `max_chars` characters.
pub fn validate_text(input: &str, max_chars: usize) -> Result<String, InputError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(InputError::EmptyText);
    }

    let len = text.chars().count();
    if len > max_chars {
        return Err(InputError::TooLong {
            len,
            max: max_chars,
        });
    }

    Ok(text.to_string())
}

/// Trimmed post URL, if non-empty.
///
/// Implausible URLs are still accepted; the service decides.
pub fn validate_url(input: &str) -> Result<String, InputError> {
    let url = input.trim();
    if url.is_empty() {
        return Err(InputError::EmptyUrl);
    }

    if !looks_like_url(url) {
        warn!("Input does not look like a web URL: {}", url);
    }

    Ok(url.to_string())
}

/// Loose check for `http(s)://host...`.
pub fn looks_like_url(input: &str) -> bool {
    let rest = match input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
    {
        Some(rest) => rest,
        None => return false,
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    !host.is_empty() && !rest.contains(char::is_whitespace)
}

/// Trimmed texts for a batch request.
pub fn validate_batch(inputs: &[String], max_chars: usize) -> Result<Vec<String>, InputError> {
    if inputs.is_empty() {
        return Err(InputError::EmptyBatch);
    }
    if inputs.len() > MAX_BATCH_SIZE {
        return Err(InputError::BatchTooLarge {
            count: inputs.len(),
            max: MAX_BATCH_SIZE,
        });
    }

    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| match validate_text(input, max_chars) {
            Err(InputError::EmptyText) => Err(InputError::EmptyBatchItem { index: index + 1 }),
            other => other,
        })
        .collect()
}
