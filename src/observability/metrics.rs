//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define edge metrics (proxied requests, latency, preflights, resolutions)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `edge_proxy_requests_total` (counter): proxied requests by method, status
//! - `edge_proxy_request_duration_seconds` (histogram): backend round trip
//! - `edge_proxy_preflight_total` (counter): locally answered OPTIONS
//! - `edge_geo_resolutions_total` (counter): resolutions by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Labels are low-cardinality (no paths, no addresses)

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_proxy_request(method: &Method, status: StatusCode, start: Instant) {
    let method = method.to_string();
    let status = status.as_u16().to_string();
    metrics::counter!(
        "edge_proxy_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "edge_proxy_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_preflight() {
    metrics::counter!("edge_proxy_preflight_total").increment(1);
}

pub fn record_geo_resolution(outcome: &'static str) {
    metrics::counter!("edge_geo_resolutions_total", "outcome" => outcome).increment(1);
}
