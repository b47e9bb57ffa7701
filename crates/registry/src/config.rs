//! Registry configuration and builder
//!
//! Settings apply to every instance a [`MetricsRegistry`](crate::MetricsRegistry)
//! constructs. The defaults reproduce the classic Coda-Hale metric family:
//! a 1028-slot forward-decaying reservoir biased toward the last five
//! minutes, and meters that tick every five seconds.

use std::time::Duration;

use crate::error::{RegistryError, RegistryResult};

/// Default reservoir size for histograms and timers
pub const DEFAULT_RESERVOIR_SIZE: usize = 1028;

/// Default forward-decay factor for histogram reservoirs
pub const DEFAULT_DECAY_ALPHA: f64 = 0.015;

/// Default EWMA tick interval for meters
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Default interval after which reservoir priorities are rescaled
pub const DEFAULT_RESCALE_THRESHOLD: Duration = Duration::from_secs(60 * 60);

/// Configuration for metric instances created by a registry
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    /// Maximum number of samples kept by each histogram reservoir
    pub reservoir_size: usize,

    /// Forward-decay factor; larger values bias toward recent samples
    pub decay_alpha: f64,

    /// Interval at which meter EWMAs are advanced
    pub tick_interval: Duration,

    /// Interval after which reservoir priorities are rescaled
    pub rescale_threshold: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            reservoir_size: DEFAULT_RESERVOIR_SIZE,
            decay_alpha: DEFAULT_DECAY_ALPHA,
            tick_interval: DEFAULT_TICK_INTERVAL,
            rescale_threshold: DEFAULT_RESCALE_THRESHOLD,
        }
    }
}

impl RegistryConfig {
    /// Create a configuration builder
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use dimetrics_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::builder()
    ///     .reservoir_size(256)
    ///     .tick_interval(Duration::from_secs(1))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.reservoir_size, 256);
    /// ```
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> RegistryResult<()> {
        if self.reservoir_size == 0 {
            return Err(RegistryError::InvalidConfig {
                message: "reservoir_size must be greater than 0".to_string(),
            });
        }

        if !self.decay_alpha.is_finite() || self.decay_alpha < 0.0 {
            return Err(RegistryError::InvalidConfig {
                message: "decay_alpha must be a finite, non-negative number".to_string(),
            });
        }

        if self.tick_interval.is_zero() {
            return Err(RegistryError::InvalidConfig {
                message: "tick_interval must be greater than 0".to_string(),
            });
        }

        if self.rescale_threshold.is_zero() {
            return Err(RegistryError::InvalidConfig {
                message: "rescale_threshold must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for [`RegistryConfig`] with fluent API
#[derive(Debug, Default)]
pub struct RegistryConfigBuilder {
    config: RegistryConfig,
}

impl RegistryConfigBuilder {
    pub fn reservoir_size(mut self, size: usize) -> Self {
        self.config.reservoir_size = size;
        self
    }

    pub fn decay_alpha(mut self, alpha: f64) -> Self {
        self.config.decay_alpha = alpha;
        self
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    pub fn rescale_threshold(mut self, threshold: Duration) -> Self {
        self.config.rescale_threshold = threshold;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> RegistryResult<RegistryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RegistryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reservoir_size, 1028);
        assert_eq!(config.tick_interval, Duration::from_secs(5));
    }

    /// Validates the builder rejects zero-sized reservoirs and zero ticks.
    ///
    /// Assertions:
    /// - Ensures both builds return `RegistryError::InvalidConfig`.
    #[test]
    fn test_builder_rejects_invalid_values() {
        let zero_reservoir = RegistryConfig::builder().reservoir_size(0).build();
        assert!(matches!(zero_reservoir, Err(RegistryError::InvalidConfig { .. })));

        let zero_tick = RegistryConfig::builder().tick_interval(Duration::ZERO).build();
        assert!(matches!(zero_tick, Err(RegistryError::InvalidConfig { .. })));
    }

    #[test]
    fn test_builder_rejects_nan_alpha() {
        let result = RegistryConfig::builder().decay_alpha(f64::NAN).build();
        assert!(result.is_err());
    }
}
