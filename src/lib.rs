//! Filtering reverse proxy for source-hosting, model-hub and CDN upstreams.
//!
//! The request path carries an absolute upstream URL. It is classified
//! against a fixed table of upstream shapes, the extracted owner is checked
//! against hot-reloaded allow/deny lists, and the upstream response is
//! streamed back with redirects resolved by the proxy itself.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
