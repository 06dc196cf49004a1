//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → request.rs (strip routing prefix, recover candidate URL)
//!     → script.rs (diagnostic token, answered locally)
//!     → proxy engine (validate, fetch, resolve redirects)
//!     → Send to client
//! ```

pub mod request;
pub mod script;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
