//! Upstream routing subsystem.
//!
//! # Data Flow
//! ```text
//! Candidate target URL (prefix already stripped)
//!     → matcher.rs (scheme strip, ordered pattern table)
//!     → Return: UpstreamMatch { kind, captures } or no match
//! ```
//!
//! # Design Decisions
//! - Pattern table compiled once, immutable at runtime
//! - Deterministic: same input always matches same shape
//! - First match wins (table order is priority order)

pub mod matcher;

pub use matcher::{match_upstream, UpstreamKind, UpstreamMatch};
