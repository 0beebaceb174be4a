//! Trial execution.

use std::time::Duration;

use cpu_time::ThreadTime;

use rand::rngs::StdRng;
use rand::SeedableRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::config::TrialConfig;
use crate::lam::{AnnealingSchedule, OptimizedSchedule, ReferenceSchedule, ScheduleError};

/// Candidate cost of the `i`-th move of a run whose current cost is `current`.
///
/// Even moves worsen by `i mod 1000`, odd moves improve by the same amount,
/// so roughly half of all calls exercise the Metropolis test.
#[inline]
pub fn synthetic_candidate(current: f64, i: u64) -> f64 {
    let offset = (i % 1000) as f64;
    if i % 2 == 0 {
        current + offset
    } else {
        current - offset
    }
}

/// Outcome of driving one schedule through a trial.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrialResult {
    /// Name of the schedule variant.
    pub schedule: String,
    /// Calls per run.
    pub run_length: u64,
    /// Number of runs.
    pub restarts: u64,
    /// Accepted moves over all runs.
    pub accepted: u64,
    /// Accepted moves per run.
    pub mean_accepted: f64,
    /// Temperature after the last call of the last run.
    pub final_temperature: f64,
    /// FNV-1a hash of the accept/reject sequence over all runs.
    pub decision_checksum: u64,
    /// CPU time of the calling thread spent inside `init` and `accept`.
    pub cpu_time: Duration,
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Relative gap allowed between the final temperatures of matched trials.
const TEMPERATURE_TOLERANCE: f64 = 1e-9;

#[inline]
fn fold_decision(hash: u64, accepted: bool) -> u64 {
    (hash ^ accepted as u64).wrapping_mul(FNV_PRIME)
}

/// Reference and optimized results of one matched trial.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Comparison {
    pub reference: TrialResult,
    pub optimized: TrialResult,
}

impl Comparison {
    /// Whether both variants made the same decision on every call and
    /// ended at the same temperature (up to rounding).
    pub fn outcomes_match(&self) -> bool {
        let (a, b) = (&self.reference, &self.optimized);
        let scale = a.final_temperature.abs().max(b.final_temperature.abs());
        a.accepted == b.accepted
            && a.decision_checksum == b.decision_checksum
            && (a.final_temperature - b.final_temperature).abs() <= TEMPERATURE_TOLERANCE * scale
    }

    /// Reference time divided by optimized time. `None` if the optimized
    /// run was too fast to measure.
    pub fn speedup(&self) -> Option<f64> {
        let optimized = self.optimized.cpu_time.as_secs_f64();
        if optimized > 0.0 {
            Some(self.reference.cpu_time.as_secs_f64() / optimized)
        } else {
            None
        }
    }
}

/// Runs schedule-only trials.
pub struct TrialRunner;

impl TrialRunner {
    /// Drives `schedule` through `config.restarts` runs of the synthetic
    /// move stream. Run `r` starts from a current cost of `1000 * r`.
    ///
    /// Timing is per-thread CPU time, so trials running side by side do not
    /// charge each other for scheduling.
    pub fn run<S: AnnealingSchedule + ?Sized>(
        schedule: &mut S,
        config: &TrialConfig,
    ) -> Result<TrialResult, ScheduleError> {
        config.validate().map_err(ScheduleError::InvalidConfig)?;
        let run_length = config.run_length as i64;

        let start = ThreadTime::now();
        let mut accepted = 0u64;
        let mut checksum = FNV_OFFSET;
        for r in 0..config.restarts {
            schedule.init(run_length)?;
            let current = 1000.0 * r as f64;
            for i in 0..config.run_length {
                let decision = schedule.accept(synthetic_candidate(current, i), current)?;
                accepted += decision as u64;
                checksum = fold_decision(checksum, decision);
            }
        }
        let cpu_time = start.elapsed();

        Ok(TrialResult {
            schedule: schedule.name().to_string(),
            run_length: config.run_length,
            restarts: config.restarts,
            accepted,
            mean_accepted: accepted as f64 / config.restarts as f64,
            final_temperature: schedule.temperature(),
            decision_checksum: checksum,
            cpu_time,
        })
    }

    /// Runs both variants on identically seeded sources.
    ///
    /// With the `parallel` feature the two trials run on separate threads.
    pub fn compare(config: &TrialConfig) -> Result<Comparison, ScheduleError> {
        config.validate().map_err(ScheduleError::InvalidConfig)?;

        let reference = || {
            let mut lam = ReferenceSchedule::new(StdRng::seed_from_u64(config.seed));
            Self::run(&mut lam, config)
        };
        let optimized = || {
            let mut lam = OptimizedSchedule::new(StdRng::seed_from_u64(config.seed));
            Self::run(&mut lam, config)
        };

        #[cfg(feature = "parallel")]
        let (reference, optimized) = rayon::join(reference, optimized);
        #[cfg(not(feature = "parallel"))]
        let (reference, optimized) = (reference(), optimized());

        let comparison = Comparison {
            reference: reference?,
            optimized: optimized?,
        };
        tracing::debug!(
            run_length = config.run_length,
            restarts = config.restarts,
            reference_accepted = comparison.reference.accepted,
            optimized_accepted = comparison.optimized.accepted,
            reference_cpu_ns = comparison.reference.cpu_time.as_nanos() as u64,
            optimized_cpu_ns = comparison.optimized.cpu_time.as_nanos() as u64,
            "trial comparison finished"
        );
        if !comparison.outcomes_match() {
            tracing::warn!(
                run_length = config.run_length,
                restarts = config.restarts,
                reference_checksum = comparison.reference.decision_checksum,
                optimized_checksum = comparison.optimized.decision_checksum,
                "schedule variants disagree"
            );
        }
        Ok(comparison)
    }
}
