//! Shared outbound HTTP client.
//!
//! One connection-pooled `reqwest::Client` serves every proxy call. It never
//! follows redirects itself; the engine decides what to do with them.

use std::time::Duration;

use axum::http::{HeaderMap, Method};
use reqwest::redirect;
use url::Url;

use crate::config::UpstreamConfig;
use crate::proxy::error::ProxyError;

#[derive(Clone)]
pub struct UpstreamClient {
    inner: reqwest::Client,
    header_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            // Covers the TCP dial and the TLS handshake.
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .tcp_keepalive(Duration::from_secs(config.keepalive_secs))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .no_proxy();

        for (host, addr) in &config.resolve {
            tracing::info!(host = %host, addr = %addr, "Pinned upstream host");
            builder = builder.resolve(host, *addr);
        }

        Ok(Self {
            inner: builder.build()?,
            header_timeout: Duration::from_secs(config.response_header_timeout_secs),
        })
    }

    /// Send one request and wait for the response head.
    ///
    /// The wait is bounded by the response-header timeout; the body is
    /// left unread for the caller to stream.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<reqwest::Body>,
    ) -> Result<reqwest::Response, ProxyError> {
        let mut builder = self.inner.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let request = builder
            .build()
            .map_err(|e| ProxyError::RequestBuild(e.to_string()))?;

        match tokio::time::timeout(self.header_timeout, self.inner.execute(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ProxyError::UpstreamUnreachable(e.to_string())),
            Err(_) => Err(ProxyError::UpstreamUnreachable(format!(
                "no response headers within {:?}",
                self.header_timeout
            ))),
        }
    }
}
