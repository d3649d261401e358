//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): proxied requests by route, status
//! - `gateway_request_duration_seconds` (histogram): proxied request latency by route
//! - `gateway_normalizer_decisions_total` (counter): redirects and delegations by rule
//! - `gateway_locale_routes_total` (counter): locale redirects and rewrites by locale
//! - `gateway_upstream_errors_total` (counter): failed upstream calls by upstream
//!
//! # Design Decisions
//! - Metric calls are no-ops until a recorder is installed
//! - Prometheus exporter runs its own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed upstream request.
pub fn record_request(route: &'static str, method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "route" => route,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record one normalizer outcome.
pub fn record_decision(decision: &'static str) {
    counter!("gateway_normalizer_decisions_total", "decision" => decision).increment(1);
}

/// Record one locale routing outcome.
pub fn record_locale_route(outcome: &'static str, locale: &str) {
    counter!(
        "gateway_locale_routes_total",
        "outcome" => outcome,
        "locale" => locale.to_string()
    )
    .increment(1);
}

/// Record a failed upstream call.
pub fn record_upstream_error(upstream: &'static str) {
    counter!("gateway_upstream_errors_total", "upstream" => upstream).increment(1);
}
