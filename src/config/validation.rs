//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (probabilities, latency bounds, batch size)
//! - Validate URLs and bind addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: probability {value} is outside [0, 1]")]
    Probability { field: String, value: f64 },

    #[error("latency.min_ms ({min}) exceeds latency.max_ms ({max})")]
    LatencyRange { min: u64, max: u64 },

    #[error("{field}: invalid URL '{value}'")]
    Url { field: &'static str, value: String },

    #[error("observability.metrics_address: invalid socket address '{0}'")]
    MetricsAddress(String),

    #[error("observability.batch_size must be greater than zero")]
    BatchSize,
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in config.faults.entries() {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ValidationError::Probability { field, value });
        }
    }

    if config.latency.min_ms > config.latency.max_ms {
        errors.push(ValidationError::LatencyRange {
            min: config.latency.min_ms,
            max: config.latency.max_ms,
        });
    }

    if Url::parse(&config.api.base_url).is_err() {
        errors.push(ValidationError::Url {
            field: "api.base_url",
            value: config.api.base_url.clone(),
        });
    }

    let obs = &config.observability;
    if let Some(url) = &obs.collector_url {
        if Url::parse(url).is_err() {
            errors.push(ValidationError::Url {
                field: "observability.collector_url",
                value: url.clone(),
            });
        }
    }

    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(obs.metrics_address.clone()));
    }

    if obs.batch_size == 0 {
        errors.push(ValidationError::BatchSize);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
