//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → middleware.rs (RewriteContext, rule pipeline, outcome)
//!         Done → engine response or error-handler transfer
//!         Continue/Stop → rewritten request goes downstream
//!     → queued response headers appended
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{rewrite_middleware, RewriteProperties, RewriteState};
pub use server::HttpServer;
