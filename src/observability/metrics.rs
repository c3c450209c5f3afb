//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_http_requests_total` (counter): requests by route, status
//! - `gateway_http_request_duration_seconds` (histogram): latency by route
//! - `gateway_rpc_probes_total` (counter): endpoint probes by endpoint, outcome
//! - `gateway_withdrawals_total` (counter): withdrawals by outcome
//! - `gateway_balance_queries_total` (counter): balance reads by outcome
//!
//! Endpoint labels are always the redacted origin, never the full URL.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_http_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_http_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_probe(endpoint: &str, success: bool) {
    metrics::counter!(
        "gateway_rpc_probes_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);
}

/// `outcome` is `"confirmed"` or a `ServiceError::kind` label.
pub fn record_withdrawal(outcome: &'static str) {
    metrics::counter!("gateway_withdrawals_total", "outcome" => outcome).increment(1);
}

pub fn record_balance_query(success: bool) {
    metrics::counter!("gateway_balance_queries_total", "outcome" => outcome(success)).increment(1);
}
