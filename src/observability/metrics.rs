//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rewriter_requests_total` (counter): requests by outcome signal
//! - `rewriter_rule_outcomes_total` (counter): intercepting rules by action kind and signal
//! - `rewriter_reloads_total` (counter): configuration reloads by result
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are low-cardinality (no URLs, no rule indexes)

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::actions::Signal;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Final outcome of the pipeline for one request.
pub fn record_request(signal: Signal) {
    metrics::counter!("rewriter_requests_total", "signal" => signal.as_str()).increment(1);
}

/// A rule that ended rule processing.
pub fn record_rule_outcome(kind: &'static str, signal: Signal) {
    metrics::counter!(
        "rewriter_rule_outcomes_total",
        "action" => kind,
        "signal" => signal.as_str()
    )
    .increment(1);
}

pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("rewriter_reloads_total", "result" => result).increment(1);
}
