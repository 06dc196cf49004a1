//! Header sanitation for both directions of the relay.
//!
//! # Responsibilities
//! - Drop `Host` from forwarded requests (the client sets its own)
//! - Drop body framing from forwarded requests that carry no body
//! - Strip security-policy headers from upstream responses
//! - Strip hop-by-hop response headers owned by the server framing layer

use axum::http::{header, HeaderMap, HeaderName};

/// Response headers never relayed to the caller.
pub const STRIPPED_SECURITY_HEADERS: [HeaderName; 3] = [
    header::CONTENT_SECURITY_POLICY,
    header::REFERRER_POLICY,
    header::STRICT_TRANSPORT_SECURITY,
];

/// Whether a header is a hop-by-hop header (RFC 7230, section 6.1).
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-connection"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Copy inbound request headers for forwarding, keeping every value of
/// multi-valued headers and dropping only `Host`.
pub fn forward_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(header::HOST);
    headers
}

/// Remove `Content-Length` and `Transfer-Encoding` from a forwarded request
/// that is sent without a body. The client frames an empty request itself.
pub fn strip_body_framing(headers: &mut HeaderMap) {
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::TRANSFER_ENCODING);
}

/// Remove the headers the caller must not see from an upstream response.
pub fn sanitize_response_headers(headers: &mut HeaderMap) {
    for name in &STRIPPED_SECURITY_HEADERS {
        headers.remove(name);
    }
    let hop_by_hop: Vec<HeaderName> = headers
        .keys()
        .filter(|name| is_hop_by_hop(name))
        .cloned()
        .collect();
    for name in hop_by_hop {
        headers.remove(name);
    }
}
