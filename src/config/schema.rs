//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Inbound routing prefix.
    pub routing: RoutingConfig,

    /// Outbound client tuning.
    pub upstream: UpstreamConfig,

    /// Response and redirect limits.
    pub limits: LimitsConfig,

    /// Allow/deny list source and reload cadence.
    pub access: AccessConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Inbound routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path prefix stripped from inbound requests and prepended to
    /// rewritten redirect locations. Empty means the proxy is mounted at `/`.
    pub prefix: String,
}

/// Outbound client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Dial timeout in seconds, including the TLS handshake.
    pub connect_timeout_secs: u64,

    /// TCP keep-alive interval in seconds.
    pub keepalive_secs: u64,

    /// Maximum wait for upstream response headers in seconds.
    pub response_header_timeout_secs: u64,

    /// How long an idle pooled connection is kept, in seconds.
    pub pool_idle_timeout_secs: u64,

    /// Idle connections kept per upstream host.
    pub pool_max_idle_per_host: usize,

    /// Static DNS overrides: upstream host name to socket address.
    pub resolve: HashMap<String, SocketAddr>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            keepalive_secs: 30,
            response_header_timeout_secs: 300,
            pool_idle_timeout_secs: 90,
            pool_max_idle_per_host: 1000,
            resolve: HashMap::new(),
        }
    }
}

/// Response and redirect limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest declared `Content-Length` relayed to the caller, in bytes.
    pub size_limit: u64,

    /// Unmatched redirects followed before giving up.
    pub max_redirects: usize,
}

/// 10 GiB.
pub const DEFAULT_SIZE_LIMIT: u64 = 10 * 1024 * 1024 * 1024;

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
            max_redirects: 20,
        }
    }
}

/// Access list source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Path to the JSON allow/deny document.
    pub path: String,

    /// Reload interval in seconds.
    pub reload_interval_secs: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            path: "config.json".to_string(),
            reload_interval_secs: 600,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
