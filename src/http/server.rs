//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the single catch-all handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener and drain on shutdown
//! - Dispatch requests to the proxy engine

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ConfigStore, ProxyConfig};
use crate::http::request::{extract_target, X_REQUEST_ID};
use crate::http::script::{self, DIAGNOSTIC_TOKEN};
use crate::observability::metrics;
use crate::proxy::{ProxyEngine, ProxyError, ProxyRequest};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProxyEngine>,
    pub store: Arc<ConfigStore>,
    pub prefix: Arc<str>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving the access lists held by `store`.
    pub fn new(config: ProxyConfig, store: Arc<ConfigStore>) -> Result<Self, reqwest::Error> {
        let engine = Arc::new(ProxyEngine::from_config(&config)?);
        let state = AppState {
            engine,
            store,
            prefix: Arc::from(config.routing.prefix.as_str()),
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(&X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()));

        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.routing.prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: the request path carries the upstream URL.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();

    let Some(target) = extract_target(&parts.uri, &state.prefix) else {
        return reject(ProxyError::InputRejected, start_time);
    };

    if target == DIAGNOSTIC_TOKEN {
        let base = script::base_url(&parts.headers, &state.prefix);
        metrics::record_request("script", 200, start_time);
        return script::script_response(&base);
    }

    tracing::debug!(method = %parts.method, target = %target, "Proxying request");

    let policy = state.store.current();
    let request = ProxyRequest {
        method: parts.method,
        target,
        headers: parts.headers,
        body,
    };

    match state.engine.handle(request, &policy).await {
        Ok(response) => {
            let status = response.status();
            let outcome = if status.is_redirection() { "redirect" } else { "relayed" };
            metrics::record_request(outcome, status.as_u16(), start_time);
            response
        }
        Err(e) => reject(e, start_time),
    }
}

fn reject(error: ProxyError, start_time: Instant) -> Response {
    tracing::warn!(error = %error, status = %error.status(), "Request not proxied");
    metrics::record_request(error.outcome(), error.status().as_u16(), start_time);
    error.into_response()
}
