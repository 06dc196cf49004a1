//! Response size ceiling.
//!
//! Only the declared `Content-Length` is inspected. A response without one
//! passes, and the streamed byte count is not tracked.

use axum::http::{header, HeaderMap};

/// Parse the declared `Content-Length`, if present and well-formed.
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Returns true if the declared length is over `ceiling`.
pub fn exceeds_ceiling(headers: &HeaderMap, ceiling: u64) -> bool {
    declared_length(headers).is_some_and(|len| len > ceiling)
}
