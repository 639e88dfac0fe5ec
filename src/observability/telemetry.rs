//! Process-wide telemetry handle.
//!
//! # Responsibilities
//! - Hold the currently installed sink behind a swappable pointer
//! - Initialize the collector sink from configuration
//! - Tear down cleanly, flushing buffered records
//!
//! # Design Decisions
//! - The handle starts with a no-op sink; `init` replaces it, `shutdown`
//!   puts the no-op back
//! - A collector that fails to start is logged and replaced by the tracing
//!   sink; startup continues

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use arc_swap::ArcSwap;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::ObservabilityConfig;
use crate::lifecycle::Shutdown;
use crate::observability::collector::{CollectorSettings, CollectorSink};
use crate::observability::sink::{LogValue, NoopSink, ObservabilitySink, SinkError, TracingSink};

/// Errors raised while initializing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid collector URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported collector URL scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("failed to build collector client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("telemetry requires a running Tokio runtime")]
    NoRuntime,
}

struct Installed(Arc<dyn ObservabilitySink>);

/// Swappable sink handle. Forwards every record to the installed sink.
pub struct Telemetry {
    slot: ArcSwap<Installed>,
}

impl Telemetry {
    /// Create a handle with the no-op sink installed.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(NoopSink))
    }

    pub fn with_sink(sink: Arc<dyn ObservabilitySink>) -> Self {
        Self {
            slot: ArcSwap::from_pointee(Installed(sink)),
        }
    }

    /// The sink currently installed.
    pub fn sink(&self) -> Arc<dyn ObservabilitySink> {
        self.slot.load().0.clone()
    }

    pub fn install(&self, sink: Arc<dyn ObservabilitySink>) {
        self.slot.store(Arc::new(Installed(sink)));
    }

    /// Put the no-op sink back, returning the previous one.
    pub fn reset(&self) -> Arc<dyn ObservabilitySink> {
        let previous = self.slot.swap(Arc::new(Installed(Arc::new(NoopSink))));
        previous.0.clone()
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservabilitySink for Telemetry {
    fn push_log(&self, fields: &[LogValue]) {
        self.slot.load().0.push_log(fields);
    }

    fn push_error(&self, error: &SinkError) {
        self.slot.load().0.push_error(error);
    }
}

static GLOBAL: OnceLock<Arc<Telemetry>> = OnceLock::new();

/// The process-wide telemetry handle.
pub fn global() -> Arc<Telemetry> {
    GLOBAL.get_or_init(|| Arc::new(Telemetry::new())).clone()
}

/// Keeps the collector worker alive; call [`TelemetryGuard::shutdown`] to flush.
#[must_use = "dropping the guard stops the collector worker; hold it and call `shutdown`"]
pub struct TelemetryGuard {
    telemetry: Arc<Telemetry>,
    shutdown: Shutdown,
    worker: Option<JoinHandle<()>>,
}

impl TelemetryGuard {
    /// Whether a collector sink was installed.
    pub fn is_collecting(&self) -> bool {
        self.worker.is_some()
    }

    /// Uninstall the sink, flush pending records and wait for the worker.
    pub async fn shutdown(self, timeout: Duration) {
        self.telemetry.reset();
        self.shutdown.trigger();
        if let Some(worker) = self.worker {
            if tokio::time::timeout(timeout, worker).await.is_err() {
                tracing::warn!(?timeout, "Telemetry flush timed out");
            }
        }
    }
}

/// Initialize the global handle from configuration.
pub fn init(config: &ObservabilityConfig) -> TelemetryGuard {
    init_with(global(), config)
}

/// Initialize `telemetry` from configuration.
///
/// Without a collector URL the no-op sink stays installed. If the collector
/// cannot be set up the error is logged and [`TracingSink`] is installed.
pub fn init_with(telemetry: Arc<Telemetry>, config: &ObservabilityConfig) -> TelemetryGuard {
    let shutdown = Shutdown::new();
    let mut guard = TelemetryGuard {
        telemetry,
        shutdown,
        worker: None,
    };

    let Some(url) = config.collector_url.as_deref() else {
        tracing::warn!("Collector URL not provided, skipping telemetry initialization");
        return guard;
    };

    match start_collector(url, config, &guard.shutdown) {
        Ok((sink, worker)) => {
            guard.telemetry.install(Arc::new(sink));
            guard.worker = Some(worker);
            tracing::info!(
                collector_url = %url,
                app = %config.app_name,
                environment = %config.environment,
                "Telemetry initialized"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize telemetry, logging sink records locally");
            guard.telemetry.install(Arc::new(TracingSink));
        }
    }
    guard
}

fn start_collector(
    url: &str,
    config: &ObservabilityConfig,
    shutdown: &Shutdown,
) -> Result<(CollectorSink, JoinHandle<()>), TelemetryError> {
    let settings = CollectorSettings::from_config(url, config)?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    CollectorSink::spawn(settings, client, shutdown.subscribe())
}
