//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Matched upstream URL:
//!     → access_control.rs (allow/deny owner prefixes)
//! Upstream response:
//!     → limits.rs (declared size ceiling)
//!     → headers.rs (strip security-policy and hop-by-hop headers)
//!     → Relay to caller
//! ```
//!
//! # Design Decisions
//! - Fail closed: an unclassified target is never admitted
//! - Size ceiling checked before any body byte is relayed

pub mod access_control;
pub mod headers;
pub mod limits;

pub use access_control::{AccessPolicy, Denial};
