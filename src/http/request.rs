//! Inbound request interpretation.
//!
//! # Responsibilities
//! - Strip the routing prefix and leading slashes from the request target
//! - Restore scheme slashes collapsed by intermediaries (`https:/host`)
//! - Provide the request-ID header name shared by the middleware stack
//!
//! # Design Decisions
//! - The query string is part of the candidate; upstream URLs keep theirs
//! - A path outside the routing prefix is not a candidate at all

use axum::http::{HeaderName, Uri};

/// Header carrying the per-request correlation ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The candidate target URL carried in the request path.
///
/// Returns `None` when the path does not live under `prefix`.
pub fn extract_target(uri: &Uri, prefix: &str) -> Option<String> {
    let raw = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let rest = raw.strip_prefix(prefix)?;
    if !prefix.is_empty() && !(rest.is_empty() || rest.starts_with('/')) {
        return None;
    }
    Some(restore_scheme_slashes(rest.trim_start_matches('/')))
}

/// `https:/host/...` → `https://host/...`; anything else is returned as-is.
fn restore_scheme_slashes(candidate: &str) -> String {
    for scheme in ["https:", "http:"] {
        let Some(head) = candidate.get(..scheme.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(scheme) {
            continue;
        }
        let rest = &candidate[scheme.len()..];
        if rest.starts_with('/') && !rest.starts_with("//") {
            return format!("{}/{}", head, rest);
        }
    }
    candidate.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(uri: &'static str, prefix: &str) -> Option<String> {
        extract_target(&Uri::from_static(uri), prefix)
    }

    #[test]
    fn test_strips_leading_slashes() {
        assert_eq!(
            target("/https://github.com/a/r/releases/v1", ""),
            Some("https://github.com/a/r/releases/v1".into())
        );
        assert_eq!(
            target("///https://github.com/a/r/releases/v1", ""),
            Some("https://github.com/a/r/releases/v1".into())
        );
        assert_eq!(target("/", ""), Some(String::new()));
    }

    #[test]
    fn test_keeps_query() {
        assert_eq!(
            target("/https://github.com/a/r/info/refs?service=git-upload-pack", ""),
            Some("https://github.com/a/r/info/refs?service=git-upload-pack".into())
        );
    }

    #[test]
    fn test_routing_prefix() {
        assert_eq!(
            target("/gh/https://github.com/a/r/releases/v1", "/gh"),
            Some("https://github.com/a/r/releases/v1".into())
        );
        assert_eq!(target("/ghx/https://github.com/a/r/releases/v1", "/gh"), None);
        assert_eq!(target("/other/https://github.com/a/r/releases/v1", "/gh"), None);
    }

    #[test]
    fn test_restores_collapsed_scheme() {
        assert_eq!(
            target("/https:/github.com/a/r/releases/v1", ""),
            Some("https://github.com/a/r/releases/v1".into())
        );
        assert_eq!(
            target("/HTTP:/github.com/a/r/releases/v1", ""),
            Some("HTTP://github.com/a/r/releases/v1".into())
        );
        assert_eq!(target("/perl-pe-para", ""), Some("perl-pe-para".into()));
    }
}
