//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): gate decisions by `decision`
//! - `gateway_tokens_issued_total` (counter): minted tokens by `kind`
//! - `gateway_cipher_failures_total` (counter): cipher failures by `op`

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_gate_decision(decision: &'static str) {
    ::metrics::counter!("gateway_requests_total", "decision" => decision).increment(1);
}

pub fn record_token_issued(kind: &'static str) {
    ::metrics::counter!("gateway_tokens_issued_total", "kind" => kind).increment(1);
}

pub fn record_cipher_failure(op: &'static str) {
    ::metrics::counter!("gateway_cipher_failures_total", "op" => op).increment(1);
}
