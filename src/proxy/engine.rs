//! Request validation, dispatch and redirect resolution.
//!
//! # States
//! ```text
//! Received → Rejected                       (scheme, pattern, access policy)
//! Received → Dispatched → RedirectRewritten  (Location matches an upstream shape)
//!                       → RedirectFollowed   (unmatched Location, back to Dispatched)
//!                       → Relayed            (status + headers + streamed body)
//!                       → UpstreamError      (dial/timeout/transport, size ceiling)
//! ```

use std::sync::Arc;

use axum::body::{Body, HttpBody};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::Response;
use futures_util::TryStreamExt;
use url::Url;

use crate::config::{LimitsConfig, ProxyConfig};
use crate::observability::metrics;
use crate::proxy::client::UpstreamClient;
use crate::proxy::error::ProxyError;
use crate::routing::matcher::{ensure_scheme, has_scheme, match_upstream, rewrite_blob, UpstreamKind};
use crate::security::headers::{
    forward_request_headers, sanitize_response_headers, strip_body_framing,
};
use crate::security::limits::exceeds_ceiling;
use crate::security::AccessPolicy;

/// An inbound request addressed to an absolute upstream URL.
#[derive(Debug)]
pub struct ProxyRequest {
    pub method: Method,
    pub target: String,
    pub headers: HeaderMap,
    pub body: Body,
}

/// Check a candidate target and return the URL to fetch.
///
/// Requires an explicit scheme and a recognized upstream shape, then applies
/// the access policy to the first identity capture. Blob-style paths come
/// back rewritten to their raw equivalent.
pub fn validate_target(target: &str, policy: &AccessPolicy) -> Result<String, ProxyError> {
    if !has_scheme(target) {
        return Err(ProxyError::InputRejected);
    }
    let matched = match_upstream(target).ok_or(ProxyError::InputRejected)?;
    policy
        .admit(&matched.captures)
        .map_err(ProxyError::AccessDenied)?;

    if matched.kind == UpstreamKind::GithubBlob {
        Ok(rewrite_blob(target))
    } else {
        Ok(target.to_string())
    }
}

#[derive(Clone)]
pub struct ProxyEngine {
    client: UpstreamClient,
    limits: LimitsConfig,
    route_prefix: Arc<str>,
}

impl ProxyEngine {
    pub fn new(client: UpstreamClient, limits: LimitsConfig, route_prefix: &str) -> Self {
        Self {
            client,
            limits,
            route_prefix: Arc::from(route_prefix),
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        let client = UpstreamClient::new(&config.upstream)?;
        Ok(Self::new(client, config.limits.clone(), &config.routing.prefix))
    }

    /// Validate `request.target` against `policy`, then forward it.
    pub async fn handle(
        &self,
        request: ProxyRequest,
        policy: &AccessPolicy,
    ) -> Result<Response, ProxyError> {
        let target = validate_target(&request.target, policy)?;
        self.forward(ProxyRequest { target, ..request }).await
    }

    /// Fetch an already-validated target and relay the outcome.
    ///
    /// A `Location` pointing at a recognized upstream shape is rewritten to
    /// route back through this proxy and returned as-is. Any other
    /// `Location` is followed here, up to `limits.max_redirects` times.
    /// Follow-up hops reuse the method and headers; the inbound body was
    /// consumed by the first hop, so they carry none and drop its framing
    /// headers.
    pub async fn forward(&self, request: ProxyRequest) -> Result<Response, ProxyError> {
        let ProxyRequest {
            method,
            target,
            headers,
            body,
        } = request;

        let headers = forward_request_headers(&headers);
        let mut body = Some(body);
        let mut url = Url::parse(&target).map_err(|e| ProxyError::RequestBuild(e.to_string()))?;
        let mut followed = 0usize;

        loop {
            tracing::debug!(method = %method, url = %url, hop = followed, "Dispatching upstream");

            let outbound = outbound_body(body.take());
            let mut hop_headers = headers.clone();
            if outbound.is_none() {
                strip_body_framing(&mut hop_headers);
            }

            let upstream = self
                .client
                .send(method.clone(), url.clone(), hop_headers, outbound)
                .await
                .inspect_err(|e| tracing::error!(url = %url, error = %e, "Upstream error"))?;

            let status = upstream.status();
            let mut response_headers = upstream.headers().clone();

            if exceeds_ceiling(&response_headers, self.limits.size_limit) {
                tracing::warn!(
                    url = %url,
                    limit = self.limits.size_limit,
                    "Declared content length over the ceiling"
                );
                return Err(ProxyError::ResponseTooLarge);
            }

            sanitize_response_headers(&mut response_headers);

            // Upstreams may send raw non-ASCII bytes here.
            let location = response_headers
                .get(header::LOCATION)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

            let Some(location) = location else {
                return Ok(relay(status, response_headers, upstream));
            };

            if match_upstream(&location).is_some() {
                let rewritten = format!("{}/{}", self.route_prefix, ensure_scheme(&location));
                let value = HeaderValue::from_bytes(rewritten.as_bytes())
                    .map_err(|e| ProxyError::RequestBuild(e.to_string()))?;
                tracing::debug!(from = %location, to = %rewritten, "Rewrote upstream redirect");
                response_headers.insert(header::LOCATION, value);
                return Ok(relay(status, response_headers, upstream));
            }

            if followed >= self.limits.max_redirects {
                tracing::warn!(url = %url, limit = self.limits.max_redirects, "Redirect limit reached");
                return Err(ProxyError::TooManyRedirects(self.limits.max_redirects));
            }

            url = url
                .join(&location)
                .map_err(|e| ProxyError::RequestBuild(e.to_string()))?;
            followed += 1;
            metrics::record_redirect_followed();
            tracing::debug!(location = %url, hop = followed, "Following upstream redirect");
        }
    }
}

/// Turn the inbound body into an outbound one. Known-empty bodies are not
/// sent at all, so bodiless methods stay bodiless upstream.
fn outbound_body(body: Option<Body>) -> Option<reqwest::Body> {
    let body = body?;
    if body.size_hint().exact() == Some(0) {
        return None;
    }
    Some(reqwest::Body::wrap_stream(body.into_data_stream()))
}

/// Build the caller's response around the upstream body stream.
///
/// A stream error mid-copy ends the body early; the caller sees a truncated
/// connection rather than an error response.
fn relay(status: StatusCode, headers: HeaderMap, upstream: reqwest::Response) -> Response {
    let stream = upstream
        .bytes_stream()
        .inspect_err(|e| tracing::debug!(error = %e, "Upstream body ended early"));

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
