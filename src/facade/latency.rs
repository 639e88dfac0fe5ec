//! Artificial latency model.

use std::time::Duration;

use rand::Rng;

use crate::config::LatencyConfig;

/// Uniform delay in `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyModel {
    min: Duration,
    max: Duration,
}

impl LatencyModel {
    /// Create a model; `max` is raised to `min` if smaller.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Always the same delay.
    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay)
    }

    /// No delay at all.
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..self.max)
    }
}

impl Default for LatencyModel {
    fn default() -> Self {
        Self::from(&LatencyConfig::default())
    }
}

impl From<&LatencyConfig> for LatencyModel {
    fn from(config: &LatencyConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_ms),
            Duration::from_millis(config.max_ms),
        )
    }
}
