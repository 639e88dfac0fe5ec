//! Instrumented data-access facade.
//!
//! # Data Flow
//! ```text
//! caller
//!     → Api { users, products, orders }
//!     → Resource<R> (get_all / get_by_id / create / update / delete)
//!     → instrument.rs (events, delay, faults, cancellation)
//!     → Store<R>
//! ```
//!
//! # Design Decisions
//! - One pipeline (`Instrumentation`) shared by all resources of an `Api`
//! - Latency, fault policy and missing-record policy can be swapped at
//!   runtime; the store mode is fixed at construction
//! - Calls are independent futures; nothing orders concurrent calls

pub mod fault;
pub mod instrument;
pub mod latency;
pub mod operation;
pub mod resource;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::model::{Order, Product, User};
use crate::observability::{telemetry, Telemetry};
use crate::store::{Store, StoreMode};

pub use fault::{FaultPolicy, NoFaults, ProbabilisticFaults};
pub use instrument::{Behavior, Instrumentation};
pub use latency::LatencyModel;
pub use operation::{Operation, OperationContext};
pub use resource::Resource;

/// What `get_by_id` does with an id that matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRecordPolicy {
    /// Settle successfully with `data = None`.
    #[default]
    Absent,
    /// Settle with `ApiError::NotFound`.
    NotFound,
}

/// The facade: one resource per entity kind. Clones share the same stores.
#[derive(Clone)]
pub struct Api {
    pub users: Resource<User>,
    pub products: Resource<Product>,
    pub orders: Resource<Order>,
    core: Arc<Instrumentation>,
}

impl Api {
    /// Build from configuration, reporting to the global telemetry handle.
    pub fn new(config: &AppConfig) -> Self {
        ApiBuilder::from_config(config).build()
    }

    pub fn builder() -> ApiBuilder {
        ApiBuilder::default()
    }

    /// Apply latency, fault and missing-record settings from a reloaded config.
    pub fn reconfigure(&self, config: &AppConfig) {
        self.core.set_behavior(behavior_from(config));
        tracing::info!(
            min_ms = config.latency.min_ms,
            max_ms = config.latency.max_ms,
            missing_record = ?config.store.missing_record,
            "Facade reconfigured"
        );
    }

    pub fn telemetry(&self) -> &Arc<Telemetry> {
        self.core.telemetry()
    }
}

fn behavior_from(config: &AppConfig) -> Behavior {
    Behavior {
        latency: LatencyModel::from(&config.latency),
        faults: Arc::new(ProbabilisticFaults::new(config.faults.clone())),
        missing_records: config.store.missing_record,
    }
}

/// Builder for [`Api`]. Defaults match [`AppConfig::default`].
pub struct ApiBuilder {
    behavior: Behavior,
    mode: StoreMode,
    telemetry: Option<Arc<Telemetry>>,
}

impl Default for ApiBuilder {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ApiBuilder {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            behavior: behavior_from(config),
            mode: config.store.mode,
            telemetry: None,
        }
    }

    pub fn latency(mut self, latency: LatencyModel) -> Self {
        self.behavior.latency = latency;
        self
    }

    pub fn fault_policy(mut self, policy: impl FaultPolicy + 'static) -> Self {
        self.behavior.faults = Arc::new(policy);
        self
    }

    pub fn missing_records(mut self, policy: MissingRecordPolicy) -> Self {
        self.behavior.missing_records = policy;
        self
    }

    pub fn store_mode(mut self, mode: StoreMode) -> Self {
        self.mode = mode;
        self
    }

    /// Report to `telemetry` instead of the global handle.
    pub fn telemetry(mut self, telemetry: Arc<Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn build(self) -> Api {
        let telemetry = self.telemetry.unwrap_or_else(telemetry::global);
        let core = Arc::new(Instrumentation::new(telemetry, self.behavior));
        Api {
            users: Resource::new(Arc::new(Store::new(self.mode)), core.clone()),
            products: Resource::new(Arc::new(Store::new(self.mode)), core.clone()),
            orders: Resource::new(Arc::new(Store::new(self.mode)), core.clone()),
            core,
        }
    }
}
