//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Facade operations produce:
//!     → sink.rs (request / response / error / cancelled records)
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Sink records are routed through:
//!     → telemetry.rs (process-wide handle, swappable)
//!     → collector.rs (batched JSON shipped to the collector URL)
//! ```
//!
//! # Design Decisions
//! - Sinks default to a no-op so call sites never branch on presence
//! - Every record is emitted as a single call (one atomic record)
//! - The collector ships off the call path; a slow collector never adds latency

pub mod collector;
pub mod logging;
pub mod metrics;
pub mod sink;
pub mod telemetry;

pub use sink::{
    FanoutSink, LogValue, MemorySink, NoopSink, ObservabilitySink, SinkError, SinkEvent, TracingSink,
};
pub use telemetry::{Telemetry, TelemetryError, TelemetryGuard};
