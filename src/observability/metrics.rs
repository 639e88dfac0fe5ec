//! Metrics collection and exposition.
//!
//! # Metrics
//! - `facade_requests_total` (counter): calls by entity, operation, outcome
//! - `facade_request_duration_seconds` (histogram): end-to-end call latency
//! - `telemetry_batches_total` (counter): collector flushes by result
//! - `telemetry_events_total` (counter): records shipped to the collector
//!
//! Recording is a no-op until [`init_metrics`] installs a recorder.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::facade::Operation;
use crate::model::EntityKind;

/// How a facade call settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Cancelled,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Cancelled => "cancelled",
        }
    }
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(entity: EntityKind, operation: Operation, outcome: Outcome, elapsed: Duration) {
    ::metrics::counter!(
        "facade_requests_total",
        "entity" => entity.as_str(),
        "operation" => operation.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    ::metrics::histogram!(
        "facade_request_duration_seconds",
        "entity" => entity.as_str(),
        "operation" => operation.as_str()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_collector_flush(events: usize, delivered: bool) {
    let result = if delivered { "delivered" } else { "dropped" };
    ::metrics::counter!("telemetry_batches_total", "result" => result).increment(1);
    ::metrics::counter!("telemetry_events_total", "result" => result).increment(events as u64);
}
