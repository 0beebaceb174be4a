//! Trial configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration of one schedule trial.
///
/// # Examples
///
/// ```
/// use u_lam::trial::TrialConfig;
///
/// let config = TrialConfig::default()
///     .with_run_length(16_000)
///     .with_restarts(8)
///     .with_seed(1);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.evaluations(), 128_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrialConfig {
    /// Number of `accept` calls per run.
    pub run_length: u64,
    /// Number of runs, each preceded by `init`.
    pub restarts: u64,
    /// Seed of the schedule's random source.
    pub seed: u64,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            run_length: 2000,
            restarts: 1,
            seed: 42,
        }
    }
}

impl TrialConfig {
    pub fn with_run_length(mut self, n: u64) -> Self {
        self.run_length = n;
        self
    }

    pub fn with_restarts(mut self, n: u64) -> Self {
        self.restarts = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Total number of `accept` calls over all restarts.
    pub fn evaluations(&self) -> u64 {
        self.run_length.saturating_mul(self.restarts)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.run_length == 0 {
            return Err("run_length must be at least 1".into());
        }
        if self.run_length > i64::MAX as u64 {
            return Err(format!("run_length too large: {}", self.run_length));
        }
        if self.restarts == 0 {
            return Err("restarts must be at least 1".into());
        }
        Ok(())
    }
}
