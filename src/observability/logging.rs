//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber (pretty or JSON)
//! - Define the `RewriteLogger` capability rules report to
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - The built-in `TracingLogger` forwards rule events to `tracing`, so a
//!   configuration without `<register logger>` still logs

use std::fmt;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Sink for rule-level events (which rule fired, with what outcome).
pub trait RewriteLogger: Send + Sync + fmt::Debug {
    fn log(&self, level: Level, message: &str);
}

/// Forwards rule events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl RewriteLogger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "url_rewriter::rules", "{}", message),
            Level::WARN => tracing::warn!(target: "url_rewriter::rules", "{}", message),
            Level::INFO => tracing::info!(target: "url_rewriter::rules", "{}", message),
            Level::DEBUG => tracing::debug!(target: "url_rewriter::rules", "{}", message),
            _ => tracing::trace!(target: "url_rewriter::rules", "{}", message),
        }
    }
}

/// Install the global subscriber. Call once, at startup.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("url_rewriter={},tower_http={}", config.log_level, config.log_level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
