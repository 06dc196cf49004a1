//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! server config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!
//! access list file (JSON)
//!     → loader.rs (decode into AccessPolicy)
//!     → store.rs (ArcSwap snapshot shared by all requests)
//!
//! Every reload period:
//!     reloader.rs ticks
//!     → loader.rs decodes the access list again
//!     → atomic swap of Arc<AccessPolicy> on success only
//! ```
//!
//! # Design Decisions
//! - Server config is immutable once loaded; only the access list reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod reloader;
pub mod schema;
pub mod store;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    AccessConfig, LimitsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, RoutingConfig,
    UpstreamConfig,
};
pub use store::ConfigStore;
