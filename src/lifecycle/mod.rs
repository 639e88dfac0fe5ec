//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging → Init metrics → Init telemetry → Build Api
//!
//! Shutdown (shutdown.rs):
//!     Trigger → background tasks (collector, watcher loop) observe → exit
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl-C) → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: logging first so every later step is observable
//! - Telemetry is flushed before the process exits

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, App, StartupError};
