//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hookrelay_deliveries_total` (counter): routed deliveries by provider, outcome
//! - `hookrelay_dispatch_duration_seconds` (histogram): time from routing to publish
//! - `hookrelay_not_handled_total` (counter): requests that fell through
//!
//! # Design Decisions
//! - Outcome label is `accepted` or the error kind
//! - Recording without an installed exporter is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::signing::Provider;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);

    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_delivery(provider: Provider, outcome: &'static str, started: Instant) {
    metrics::counter!(
        "hookrelay_deliveries_total",
        "provider" => provider.as_str(),
        "outcome" => outcome
    )
    .increment(1);

    metrics::histogram!("hookrelay_dispatch_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_not_handled() {
    metrics::counter!("hookrelay_not_handled_total").increment(1);
}
