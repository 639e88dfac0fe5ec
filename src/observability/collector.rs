//! Collector sink: ships sink records to a remote telemetry collector.
//!
//! Records are pushed onto an unbounded channel (one send per record) and a
//! background task batches them into JSON payloads:
//!
//! ```text
//! {
//!   "meta":   { "app": { "name", "version", "environment" }, "session": { "id" } },
//!   "events": [ { "timestamp", "kind": "log" | "error", ... } ]
//! }
//! ```
//!
//! A batch is posted when it reaches `batch_size`, when the flush interval
//! elapses, and once more on shutdown.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use url::Url;
use uuid::Uuid;

use crate::config::ObservabilityConfig;
use crate::model::Timestamp;
use crate::observability::metrics;
use crate::observability::sink::{LogValue, ObservabilitySink, SinkError, SinkEvent};
use crate::observability::telemetry::TelemetryError;

/// Resolved collector parameters.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub endpoint: Url,
    pub meta: CollectorMeta,
    pub batch_size: usize,
    pub flush_interval: Duration,
}

impl CollectorSettings {
    pub fn from_config(url: &str, config: &ObservabilityConfig) -> Result<Self, TelemetryError> {
        let endpoint = Url::parse(url).map_err(|source| TelemetryError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(TelemetryError::UnsupportedScheme(endpoint.scheme().to_string()));
        }
        Ok(Self {
            endpoint,
            meta: CollectorMeta {
                app: AppMeta {
                    name: config.app_name.clone(),
                    version: config.app_version.clone(),
                    environment: config.environment.clone(),
                },
                session: SessionMeta { id: Uuid::new_v4() },
            },
            batch_size: config.batch_size.max(1),
            flush_interval: Duration::from_millis(config.flush_interval_ms.max(1)),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectorMeta {
    pub app: AppMeta,
    pub session: SessionMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppMeta {
    pub name: String,
    pub version: String,
    pub environment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionMeta {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
struct TimedEvent {
    timestamp: Timestamp,
    #[serde(flatten)]
    event: SinkEvent,
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    meta: &'a CollectorMeta,
    events: &'a [TimedEvent],
}

/// Sink half of the collector; cheap to push to from any task.
pub struct CollectorSink {
    tx: mpsc::UnboundedSender<TimedEvent>,
}

impl CollectorSink {
    /// Start the batching worker. It exits once `shutdown` fires (after a
    /// final flush) or every sender is gone.
    pub fn spawn(
        settings: CollectorSettings,
        client: reqwest::Client,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(Self, JoinHandle<()>), TelemetryError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TelemetryError::NoRuntime)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = runtime.spawn(run_worker(settings, client, rx, shutdown));
        Ok((Self { tx }, worker))
    }

    fn send(&self, event: SinkEvent) {
        let timed = TimedEvent {
            timestamp: Utc::now(),
            event,
        };
        if self.tx.send(timed).is_err() {
            tracing::debug!("Collector worker stopped, dropping telemetry record");
        }
    }
}

impl ObservabilitySink for CollectorSink {
    fn push_log(&self, fields: &[LogValue]) {
        self.send(SinkEvent::Log {
            fields: fields.to_vec(),
        });
    }

    fn push_error(&self, error: &SinkError) {
        self.send(SinkEvent::Error(error.clone()));
    }
}

async fn run_worker(
    settings: CollectorSettings,
    client: reqwest::Client,
    mut rx: mpsc::UnboundedReceiver<TimedEvent>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut buffer: Vec<TimedEvent> = Vec::with_capacity(settings.batch_size);
    let first_tick = tokio::time::Instant::now() + settings.flush_interval;
    let mut ticker = tokio::time::interval_at(first_tick, settings.flush_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(event) => {
                    buffer.push(event);
                    if buffer.len() >= settings.batch_size {
                        flush(&client, &settings, &mut buffer).await;
                    }
                }
                None => break,
            },
            _ = ticker.tick() => {
                if !buffer.is_empty() {
                    flush(&client, &settings, &mut buffer).await;
                }
            }
            _ = shutdown.recv() => {
                while let Ok(event) = rx.try_recv() {
                    buffer.push(event);
                }
                break;
            }
        }
    }

    if !buffer.is_empty() {
        flush(&client, &settings, &mut buffer).await;
    }
    tracing::debug!(endpoint = %settings.endpoint, "Collector worker stopped");
}

async fn flush(client: &reqwest::Client, settings: &CollectorSettings, buffer: &mut Vec<TimedEvent>) {
    let count = buffer.len();
    let payload = Payload {
        meta: &settings.meta,
        events: buffer.as_slice(),
    };

    let delivered = match client.post(settings.endpoint.clone()).json(&payload).send().await {
        Ok(res) if res.status().is_success() => true,
        Ok(res) => {
            tracing::warn!(status = %res.status(), events = count, "Collector rejected telemetry batch");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, events = count, "Failed to send telemetry batch");
            false
        }
    };

    metrics::record_collector_flush(count, delivered);
    buffer.clear();
}
