//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rollups_requests_total` (counter): processed requests by type, status
//! - `rollups_request_duration_seconds` (histogram): dispatch + flush latency by type
//! - `rollups_outputs_total` (counter): outputs delivered by kind
//! - `rollups_transport_retries_total` (counter): retried node calls by endpoint
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are static strings; no payload data ends up in labels

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one processed request.
pub fn record_request(kind: &'static str, status: &'static str, start: Instant) {
    metrics::counter!("rollups_requests_total", "type" => kind, "status" => status).increment(1);
    metrics::histogram!("rollups_request_duration_seconds", "type" => kind)
        .record(start.elapsed().as_secs_f64());
}

/// Record one delivered output.
pub fn record_output(kind: &'static str) {
    metrics::counter!("rollups_outputs_total", "kind" => kind).increment(1);
}

/// Record one retried node call.
pub fn record_retry(endpoint: &'static str) {
    metrics::counter!("rollups_transport_retries_total", "endpoint" => endpoint).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter() {
        record_request("advance", "accept", Instant::now());
        record_output("notice");
        record_retry("finish");
    }
}
