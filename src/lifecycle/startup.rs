//! Startup orchestration shared by the binaries.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::config::AppConfig;
use crate::facade::Api;
use crate::observability::{logging, metrics, telemetry, TelemetryGuard};

/// How long teardown waits for the collector to flush.
pub const TELEMETRY_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// A started application: the facade plus the telemetry it reports to.
pub struct App {
    pub config: AppConfig,
    pub api: Api,
    telemetry: TelemetryGuard,
}

impl App {
    /// Flush telemetry and tear it down.
    pub async fn stop(self) {
        self.telemetry.shutdown(TELEMETRY_FLUSH_TIMEOUT).await;
        tracing::info!("Shutdown complete");
    }
}

/// Initialize logging, metrics and telemetry, then build the facade.
///
/// Must be called from within a Tokio runtime.
pub fn start(config: AppConfig) -> Result<App, StartupError> {
    logging::init_logging(&config.observability)?;

    tracing::info!(
        environment = %config.observability.environment,
        api_base_url = %config.api.base_url,
        store_mode = ?config.store.mode,
        min_latency_ms = config.latency.min_ms,
        max_latency_ms = config.latency.max_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let telemetry = telemetry::init(&config.observability);
    let api = Api::new(&config);

    Ok(App {
        config,
        api,
        telemetry,
    })
}
