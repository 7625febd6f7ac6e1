//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine + http + config reload:
//!     → logging.rs (structured tracing events, RewriteLogger for rule events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
