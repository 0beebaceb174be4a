//! Core trait, error type and random sources for annealing schedules.

use rand::{Rng, RngCore};

/// Why an `accept` call was out of sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SequenceViolation {
    #[error("accept called before init")]
    NotInitialized,

    #[error("all {run_length} accept calls of the run were already made")]
    RunExhausted { run_length: u64 },
}

/// Caller misuse of an [`AnnealingSchedule`].
///
/// None of these are transient: they point at a bug in the search loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("run length must be at least 1, got {run_length}")]
    InvalidArgument { run_length: i64 },

    #[error("accept out of sequence: {0}")]
    OutOfSequence(#[from] SequenceViolation),

    #[error("invalid schedule config: {0}")]
    InvalidConfig(String),
}

/// A source of uniform draws in `[0, 1)`.
///
/// Every `rand` generator is a source. The schedule owns its source, so
/// two schedules given equally seeded sources see the same draws in the
/// same order.
pub trait UniformSource {
    /// Next draw in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;
}

impl<R: RngCore> UniformSource for R {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Always returns the same draw.
///
/// `FixedDraw(0.0)` accepts every worsening move whose Metropolis
/// probability is still positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDraw(pub f64);

impl UniformSource for FixedDraw {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.0
    }
}

/// Replays a recorded sequence of draws, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct ReplayDraws {
    draws: Vec<f64>,
    taken: usize,
}

impl ReplayDraws {
    /// Creates a replay source. An empty sequence replays `0.0`.
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, taken: 0 }
    }

    /// Number of draws handed out so far.
    pub fn taken(&self) -> usize {
        self.taken
    }
}

impl UniformSource for ReplayDraws {
    fn next_uniform(&mut self) -> f64 {
        let value = if self.draws.is_empty() {
            0.0
        } else {
            self.draws[self.taken % self.draws.len()]
        };
        self.taken += 1;
        value
    }
}

/// Adaptive acceptance rule for simulated annealing.
///
/// A search loop calls [`init`](AnnealingSchedule::init) once per run and
/// then [`accept`](AnnealingSchedule::accept) exactly `run_length` times,
/// keeping the candidate whenever `accept` returns `true`. An instance is
/// reused across runs by calling `init` again.
///
/// Costs follow the minimization convention: lower is better.
pub trait AnnealingSchedule {
    /// Short identifier of the variant.
    fn name(&self) -> &str;

    /// Starts a run of `run_length` acceptance decisions.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::InvalidArgument`] when `run_length < 1`. The
    /// schedule state is left untouched in that case.
    fn init(&mut self, run_length: i64) -> Result<(), ScheduleError>;

    /// Decides whether to move from a state of cost `current_cost` to one
    /// of cost `candidate_cost`, and updates the temperature.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::OutOfSequence`] before the first `init` or once
    /// `run_length` calls have been made.
    fn accept(&mut self, candidate_cost: f64, current_cost: f64) -> Result<bool, ScheduleError>;

    /// Declared length of the current run; `0` before the first `init`.
    fn run_length(&self) -> u64;

    /// Number of `accept` calls made since the last `init`.
    fn iteration_index(&self) -> u64;

    /// Current temperature.
    fn temperature(&self) -> f64;

    /// Moving average of recent accept outcomes.
    fn acceptance_rate(&self) -> f64;

    /// Target rate evaluated on the most recent `accept` (1.0 right after `init`).
    fn target_rate(&self) -> f64;
}

impl std::fmt::Display for dyn AnnealingSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Converts a caller-provided run length, rejecting values below 1.
pub(crate) fn checked_run_length(run_length: i64) -> Result<u64, ScheduleError> {
    if run_length < 1 {
        return Err(ScheduleError::InvalidArgument { run_length });
    }
    Ok(run_length as u64)
}
