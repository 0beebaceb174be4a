//! Modified Lam configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration shared by both schedule variants.
///
/// The defaults are the published Modified Lam constants. Two schedules
/// built from equal configs and fed equal draws make equal decisions.
///
/// # Examples
///
/// ```
/// use u_lam::lam::LamConfig;
///
/// let config = LamConfig::default()
///     .with_initial_temperature(1.0)
///     .with_temperature_step(0.995)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LamConfig {
    /// Temperature at the start of every run.
    pub initial_temperature: f64,

    /// Seed of the acceptance-rate moving average at the start of every run.
    pub initial_acceptance_rate: f64,

    /// Multiplicative step in (0, 1). The temperature is multiplied by it
    /// when cooling and divided by it when reheating.
    pub temperature_step: f64,

    /// Lower clamp on the temperature. Keeps the Metropolis quotient finite.
    pub min_temperature: f64,

    /// Upper clamp on the temperature.
    pub max_temperature: f64,

    /// Random seed for schedules built with `from_config`.
    pub seed: Option<u64>,
}

impl Default for LamConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 0.5,
            initial_acceptance_rate: 0.5,
            temperature_step: 0.999,
            min_temperature: f64::MIN_POSITIVE,
            max_temperature: f64::MAX,
            seed: None,
        }
    }
}

impl LamConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_initial_acceptance_rate(mut self, rate: f64) -> Self {
        self.initial_acceptance_rate = rate;
        self
    }

    pub fn with_temperature_step(mut self, step: f64) -> Self {
        self.temperature_step = step;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_max_temperature(mut self, t: f64) -> Self {
        self.max_temperature = t;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_temperature > 0.0) || !self.min_temperature.is_finite() {
            return Err(format!(
                "min_temperature must be positive and finite, got {}",
                self.min_temperature
            ));
        }
        if !(self.max_temperature >= self.min_temperature) || !self.max_temperature.is_finite() {
            return Err(format!(
                "max_temperature must be finite and >= min_temperature, got {}",
                self.max_temperature
            ));
        }
        if !(self.initial_temperature >= self.min_temperature
            && self.initial_temperature <= self.max_temperature)
        {
            return Err(format!(
                "initial_temperature must lie in [min_temperature, max_temperature], got {}",
                self.initial_temperature
            ));
        }
        if !(0.0..=1.0).contains(&self.initial_acceptance_rate) {
            return Err(format!(
                "initial_acceptance_rate must be in [0, 1], got {}",
                self.initial_acceptance_rate
            ));
        }
        if !(self.temperature_step > 0.0 && self.temperature_step < 1.0) {
            return Err(format!(
                "temperature_step must be in (0, 1), got {}",
                self.temperature_step
            ));
        }
        Ok(())
    }
}
