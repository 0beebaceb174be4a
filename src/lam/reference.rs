//! Straightforward Modified Lam schedule.
//!
//! Recomputes normalized progress and re-evaluates the target acceptance
//! curve on every call. Slow, but a line-by-line match of the published rule.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::LamConfig;
use super::curve::{CurveSegment, INITIAL_TARGET_RATE, LAM_CURVE, RATE_DECAY, RATE_GAIN};
use super::types::{
    checked_run_length, AnnealingSchedule, ScheduleError, SequenceViolation, UniformSource,
};

/// The Modified Lam schedule as published.
///
/// # Examples
///
/// ```
/// use u_lam::lam::{AnnealingSchedule, FixedDraw, ReferenceSchedule};
///
/// let mut lam = ReferenceSchedule::new(FixedDraw(0.0));
/// lam.init(100).unwrap();
/// assert!(lam.accept(5.0, 10.0).unwrap());
/// assert_eq!(lam.iteration_index(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ReferenceSchedule<R = StdRng> {
    config: LamConfig,
    source: R,
    run_length: u64,
    iteration: u64,
    temperature: f64,
    acceptance_rate: f64,
    target_rate: f64,
}

impl<R: UniformSource> ReferenceSchedule<R> {
    /// Creates a schedule with the published constants.
    pub fn new(source: R) -> Self {
        Self::build(LamConfig::default(), source)
    }

    /// Creates a schedule with a custom configuration.
    pub fn with_config(config: LamConfig, source: R) -> Result<Self, ScheduleError> {
        config.validate().map_err(ScheduleError::InvalidConfig)?;
        Ok(Self::build(config, source))
    }

    fn build(config: LamConfig, source: R) -> Self {
        Self {
            temperature: config.initial_temperature,
            acceptance_rate: config.initial_acceptance_rate,
            target_rate: INITIAL_TARGET_RATE,
            config,
            source,
            run_length: 0,
            iteration: 0,
        }
    }

    /// The configuration this schedule was built with.
    pub fn config(&self) -> &LamConfig {
        &self.config
    }

    /// Releases the random source.
    pub fn into_source(self) -> R {
        self.source
    }
}

impl ReferenceSchedule<StdRng> {
    /// Creates a schedule whose source is seeded from `config.seed`
    /// (or from entropy when no seed is set).
    pub fn from_config(config: LamConfig) -> Result<Self, ScheduleError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_config(config, StdRng::seed_from_u64(seed))
    }
}

/// Segment of the target curve that contains `phi`.
fn segment_for(phi: f64) -> &'static CurveSegment {
    let mut active = &LAM_CURVE[0];
    for segment in &LAM_CURVE[1..] {
        if phi < segment.start {
            break;
        }
        active = segment;
    }
    active
}

impl<R: UniformSource> AnnealingSchedule for ReferenceSchedule<R> {
    fn name(&self) -> &str {
        "ModifiedLamReference"
    }

    fn init(&mut self, run_length: i64) -> Result<(), ScheduleError> {
        self.run_length = checked_run_length(run_length)?;
        self.iteration = 0;
        self.temperature = self.config.initial_temperature;
        self.acceptance_rate = self.config.initial_acceptance_rate;
        self.target_rate = INITIAL_TARGET_RATE;
        Ok(())
    }

    fn accept(&mut self, candidate_cost: f64, current_cost: f64) -> Result<bool, ScheduleError> {
        if self.run_length == 0 {
            return Err(SequenceViolation::NotInitialized.into());
        }
        if self.iteration >= self.run_length {
            return Err(SequenceViolation::RunExhausted {
                run_length: self.run_length,
            }
            .into());
        }

        // Compare costs directly: equal infinities must not become a NaN delta.
        // An underflowed Metropolis probability never beats a draw.
        let accepted = candidate_cost <= current_cost
            || self.source.next_uniform()
                < ((current_cost - candidate_cost) / self.temperature).exp();

        self.acceptance_rate = if accepted {
            RATE_DECAY * self.acceptance_rate + RATE_GAIN
        } else {
            RATE_DECAY * self.acceptance_rate
        };

        self.iteration += 1;
        let phi = self.iteration as f64 / self.run_length as f64;
        self.target_rate = segment_for(phi).rate_at(phi);

        let step = self.config.temperature_step;
        let next = if self.acceptance_rate > self.target_rate {
            self.temperature * step
        } else {
            self.temperature / step
        };
        self.temperature = next.clamp(self.config.min_temperature, self.config.max_temperature);

        Ok(accepted)
    }

    fn run_length(&self) -> u64 {
        self.run_length
    }

    fn iteration_index(&self) -> u64 {
        self.iteration
    }

    fn temperature(&self) -> f64 {
        self.temperature
    }

    fn acceptance_rate(&self) -> f64 {
        self.acceptance_rate
    }

    fn target_rate(&self) -> f64 {
        self.target_rate
    }
}
