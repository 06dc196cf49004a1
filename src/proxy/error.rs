//! Caller-facing proxy failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::security::Denial;

/// Every variant is terminal for its request and is rendered as plain text.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Malformed target, missing scheme, or no recognized upstream shape.
    #[error("Invalid input.")]
    InputRejected,

    #[error("{0}")]
    AccessDenied(Denial),

    /// The outbound request could not be formed.
    #[error("server error {0}")]
    RequestBuild(String),

    /// Dial, TLS, header timeout, or transport failure.
    #[error("server error {0}")]
    UpstreamUnreachable(String),

    /// Declared content length over the ceiling.
    #[error("File too large.")]
    ResponseTooLarge,

    #[error("server error: more than {0} redirects")]
    TooManyRedirects(usize),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InputRejected | ProxyError::AccessDenied(_) => StatusCode::FORBIDDEN,
            ProxyError::ResponseTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::RequestBuild(_)
            | ProxyError::UpstreamUnreachable(_)
            | ProxyError::TooManyRedirects(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::InputRejected => "rejected",
            ProxyError::AccessDenied(_) => "denied",
            ProxyError::RequestBuild(_) => "request_error",
            ProxyError::UpstreamUnreachable(_) => "upstream_error",
            ProxyError::ResponseTooLarge => "too_large",
            ProxyError::TooManyRedirects(_) => "redirect_loop",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
