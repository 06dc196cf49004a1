//! Diagnostic script endpoint.
//!
//! `GET /perl-pe-para` returns a `perl -pe` expression that rewrites shell
//! install one-liners so their GitHub fetches go through this proxy. It
//! fetches nothing upstream and ignores the access lists.

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Path token answered with the script.
pub const DIAGNOSTIC_TOKEN: &str = "perl-pe-para";

/// How long clients may cache the script.
pub const CACHE_CONTROL: &str = "max-age=300";

/// Base URL of this proxy as seen by the caller, including the routing prefix.
pub fn base_url(headers: &HeaderMap, prefix: &str) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{}://{}{}", scheme, host, prefix)
}

/// Render the perl substitution for a proxy reachable at `base`.
pub fn render(base: &str) -> String {
    let own_url = format!("{}/{}", base, DIAGNOSTIC_TOKEN);
    format!(
        r#"s#(bash.*?\.sh)([^/\w\d])#\1 | perl -pe "$(curl -L {own_url})" \2#g; s# (git)# https://\1#g; s#(http.*?git[^/]*?/)#{base}/\1#g"#
    )
}

pub fn script_response(base: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/plain")),
            (header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL)),
        ],
        render(base),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("mirror.example:5000"));
        assert_eq!(base_url(&headers, ""), "http://mirror.example:5000");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(base_url(&headers, "/gh"), "https://mirror.example:5000/gh");
    }

    #[test]
    fn test_render_references_own_url() {
        let script = render("https://mirror.example");
        assert!(script.contains(r#"perl -pe "$(curl -L https://mirror.example/perl-pe-para)""#));
        assert!(script.contains("#https://mirror.example/\\1#g"));
        assert!(script.starts_with("s#(bash.*?\\.sh)"));
    }

    #[test]
    fn test_response_is_cacheable_text() {
        let response = script_response("http://localhost");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "max-age=300");
    }
}
