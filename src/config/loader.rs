//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `api.base_url`.
pub const ENV_API_BASE_URL: &str = "STOREFRONT_API_BASE_URL";
/// Overrides `observability.collector_url`; an empty value disables the collector.
pub const ENV_COLLECTOR_URL: &str = "STOREFRONT_COLLECTOR_URL";
/// Overrides `observability.environment`.
pub const ENV_ENVIRONMENT: &str = "STOREFRONT_ENV";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, applying environment overrides.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    finish(config)
}

/// Load from `path` if given, otherwise start from defaults. Overrides and
/// validation apply either way.
pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(AppConfig::default()),
    }
}

fn finish(mut config: AppConfig) -> Result<AppConfig, ConfigError> {
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `STOREFRONT_*` overrides using `lookup` to read variables.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_BASE_URL) {
        config.api.base_url = url;
    }
    if let Some(url) = lookup(ENV_COLLECTOR_URL) {
        config.observability.collector_url = if url.trim().is_empty() { None } else { Some(url) };
    }
    if let Some(env) = lookup(ENV_ENVIRONMENT) {
        config.observability.environment = env;
    }
}
