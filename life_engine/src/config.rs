// config.rs - Simulation settings

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_SIZE: usize = 20;
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(750);

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub size: usize,                // grid side length
    pub step_delay: Duration,       // pause before each generation
    pub workers: Option<usize>,     // None: decided from available parallelism
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            step_delay: DEFAULT_STEP_DELAY,
            workers: None,
        }
    }
}

impl SimConfig {
    pub fn new(size: usize, step_delay: Duration) -> Self {
        Self { size, step_delay, workers: None }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Sets the delay from a number of seconds, as typed by a user.
    pub fn with_delay_secs(mut self, secs: f64) -> Result<Self, ConfigError> {
        self.step_delay = delay_from_secs(secs)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if self.step_delay.is_zero() {
            return Err(ConfigError::NonPositiveDelay(0.0));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }
}

/// Converts seconds to a delay, refusing zero, negative and non-finite values.
pub fn delay_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::NonPositiveDelay(secs));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::DelayTooLarge(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        assert_eq!(config.size, 20);
        assert_eq!(config.step_delay, Duration::from_millis(750));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(SimConfig::new(0, DEFAULT_STEP_DELAY).validate(), Err(ConfigError::ZeroSize));
        assert!(SimConfig::new(5, Duration::ZERO).validate().is_err());
        assert_eq!(
            SimConfig::default().with_workers(0).validate(),
            Err(ConfigError::ZeroWorkers)
        );
    }

    #[test]
    fn delay_from_user_seconds() {
        assert_eq!(delay_from_secs(0.25), Ok(Duration::from_millis(250)));
        assert!(delay_from_secs(0.0).is_err());
        assert!(delay_from_secs(-1.5).is_err());
        assert!(delay_from_secs(f64::NAN).is_err());
        assert!(delay_from_secs(f64::INFINITY).is_err());
        assert_eq!(delay_from_secs(1e300), Err(ConfigError::DelayTooLarge(1e300)));
        assert!(ConfigError::DelayTooLarge(1e300).to_string().ends_with("is too large"));
    }
}
