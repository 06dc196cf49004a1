//! Upstream proxy engine.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (target, method, headers, body)
//!     → engine.rs validate_target (scheme, pattern, access policy, blob→raw)
//!     → engine.rs forward loop
//!         → client.rs (pooled reqwest client, bounded header wait)
//!         → security::limits (declared size ceiling)
//!         → security::headers (strip)
//!         → Location? matched → rewrite through proxy
//!                     unmatched → follow, loop
//!     → streamed Response
//! ```
//!
//! # Design Decisions
//! - Redirects are never handed to the client unless they point at a
//!   recognized upstream shape
//! - No retries anywhere; every failure is reported once
//! - Bodies stream in both directions, nothing is buffered

pub mod client;
pub mod engine;
pub mod error;

pub use client::UpstreamClient;
pub use engine::{validate_target, ProxyEngine, ProxyRequest};
pub use error::ProxyError;
