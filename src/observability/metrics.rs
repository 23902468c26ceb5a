//! Metrics collection and exposition.
//!
//! # Metrics
//! - `vcsstore_requests_total` (counter): requests by route, status
//! - `vcsstore_request_duration_seconds` (histogram): latency by route
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - Requests that match no route are labelled `none`

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Route label for requests that did not match.
pub const UNMATCHED_ROUTE: &str = "none";

/// Starts the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(%addr, "Prometheus metrics server started");
    Ok(())
}

/// Records one served request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    let labels = [
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("vcsstore_requests_total", &labels).increment(1);

    let labels = [("route", route.to_string())];
    histogram!("vcsstore_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}
