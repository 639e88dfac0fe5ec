//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::facade::{MissingRecordPolicy, Operation};
use crate::model::EntityKind;
use crate::store::StoreMode;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Data API settings (unused by the in-memory facade).
    pub api: ApiConfig,

    /// Telemetry, logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Artificial latency range.
    pub latency: LatencyConfig,

    /// Fault injection probabilities.
    pub faults: FaultConfig,

    /// Backing store behavior.
    pub store: StoreConfig,
}

/// Data API settings, kept for a future real transport.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the remote API.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Telemetry collector endpoint. `None` disables the collector.
    pub collector_url: Option<String>,

    /// Environment tag attached to every shipped record.
    pub environment: String,

    /// Application name reported to the collector.
    pub app_name: String,

    /// Application version reported to the collector.
    pub app_version: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,

    /// Records per collector request.
    pub batch_size: usize,

    /// Maximum time a record waits in the collector buffer.
    pub flush_interval_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            collector_url: None,
            environment: "development".to_string(),
            app_name: "storefront-facade".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
            batch_size: 50,
            flush_interval_ms: 2000,
        }
    }
}

/// Latency range in milliseconds: delays are drawn from `[min_ms, max_ms)`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LatencyConfig {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            min_ms: 500,
            max_ms: 1500,
        }
    }
}

/// Failure probabilities per entity kind.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FaultConfig {
    pub users: OperationFaults,
    pub products: OperationFaults,
    pub orders: OperationFaults,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            users: OperationFaults {
                delete: 0.3,
                ..Default::default()
            },
            products: OperationFaults::default(),
            orders: OperationFaults::default(),
        }
    }
}

impl FaultConfig {
    pub fn for_entity(&self, entity: EntityKind) -> &OperationFaults {
        match entity {
            EntityKind::User => &self.users,
            EntityKind::Product => &self.products,
            EntityKind::Order => &self.orders,
        }
    }

    /// Every probability with its dotted config path, e.g. `faults.users.delete`.
    pub fn entries(&self) -> Vec<(String, f64)> {
        [EntityKind::User, EntityKind::Product, EntityKind::Order]
            .into_iter()
            .flat_map(|entity| {
                let faults = self.for_entity(entity);
                Operation::ALL.into_iter().map(move |op| {
                    (
                        format!("faults.{}.{}", entity.collection(), op.as_str()),
                        faults.probability(op),
                    )
                })
            })
            .collect()
    }
}

/// Failure probability for each operation, in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OperationFaults {
    pub get_all: f64,
    pub get_by_id: f64,
    pub create: f64,
    pub update: f64,
    pub delete: f64,
}

impl OperationFaults {
    pub fn probability(&self, operation: Operation) -> f64 {
        match operation {
            Operation::GetAll => self.get_all,
            Operation::GetById => self.get_by_id,
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

/// Backing store configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub mode: StoreMode,
    pub missing_record: MissingRecordPolicy,
}
