//! Instrumented storefront data-access facade.
//!
//! Async CRUD over users, products and orders with artificial latency,
//! pluggable fault injection, cancellation and telemetry on every call.

// Core
pub mod error;
pub mod facade;
pub mod model;
pub mod store;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use facade::{Api, ApiBuilder, Resource};
pub use model::Envelope;
