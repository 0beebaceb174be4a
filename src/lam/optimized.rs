//! Modified Lam schedule with cached run constants.
//!
//! Everything that depends only on the run length is computed once in
//! `init` and kept while restarts reuse the same length. The per-call path
//! has no `powf` and no progress division: segment changes are detected by
//! comparing the call count against precomputed entry indices, and the
//! decaying part of the target rate is advanced by one multiplication.
//!
//! # Equivalence with the reference rule
//!
//! - Segment membership uses the same floating-point test as the reference
//!   (`i / L < start`), evaluated once per boundary in `init`, so every call
//!   lands in the same segment in both variants.
//! - On the first call of each segment the target rate is evaluated with
//!   the same expression as the reference and is bit-identical.
//! - Inside a segment the decaying term is `term * ratio` with
//!   `ratio = base^(-1 / (width * L))`. Its relative error grows by about
//!   one rounding per call: below 1e-10 for a segment of 10^6 calls.
//! - The acceptance test, the moving average and the temperature step use
//!   the same operations in the same order as the reference.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::LamConfig;
use super::curve::{INITIAL_TARGET_RATE, LAM_CURVE, RATE_DECAY, RATE_GAIN, SEGMENT_COUNT};
use super::types::{
    checked_run_length, AnnealingSchedule, ScheduleError, SequenceViolation, UniformSource,
};

const SEGMENTS: usize = SEGMENT_COUNT;

/// Constants of one run length. Produced by `init`, read-only in `accept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConstants {
    /// Run length these constants were computed for.
    pub run_length: u64,
    /// `1.0 / run_length`.
    pub inv_run_length: f64,
    /// First call index (1-based) at which each segment is active.
    /// `run_length + 1` for a segment the run never reaches.
    pub entries: [u64; SEGMENTS],
    /// Decaying term of each segment at its entry index.
    pub entry_terms: [f64; SEGMENTS],
    /// Per-call factor applied to the decaying term inside each segment.
    pub ratios: [f64; SEGMENTS],
}

impl RunConstants {
    /// Computes the constants for `run_length >= 1`. Callers validate the
    /// length with `checked_run_length` first.
    pub(crate) fn new(run_length: u64) -> Self {
        debug_assert!(run_length >= 1, "run length must be positive");
        let len = run_length as f64;
        let inv_run_length = 1.0 / len;

        let mut entries = [1u64; SEGMENTS];
        let mut entry_terms = [0.0; SEGMENTS];
        let mut ratios = [1.0; SEGMENTS];
        for (k, segment) in LAM_CURVE.iter().enumerate() {
            if k > 0 {
                entries[k] = first_call_at_or_after(segment.start, run_length);
            }
            if entries[k] <= run_length {
                entry_terms[k] = segment.term_at(entries[k] as f64 / len);
            }
            ratios[k] = segment.base.powf(-inv_run_length / segment.width);
        }

        Self {
            run_length,
            inv_run_length,
            entries,
            entry_terms,
            ratios,
        }
    }
}

/// Smallest call index `i` in `1..=run_length + 1` whose progress
/// `i / run_length` is not below `start`.
fn first_call_at_or_after(start: f64, run_length: u64) -> u64 {
    let len = run_length as f64;
    let reached = |i: u64| !((i as f64 / len) < start);

    let mut i = ((start * len).ceil() as u64).clamp(1, run_length.saturating_add(1));
    while i > 1 && reached(i - 1) {
        i -= 1;
    }
    while i <= run_length && !reached(i) {
        i += 1;
    }
    i
}

/// The Modified Lam schedule with the per-call work reduced to a handful
/// of multiplications and integer compares.
///
/// Produces the same accept/reject decisions as
/// [`ReferenceSchedule`](super::ReferenceSchedule) for the same costs and
/// draws. See the module docs for the numeric tolerance of the target rate.
///
/// # Examples
///
/// ```
/// use u_lam::lam::{AnnealingSchedule, FixedDraw, OptimizedSchedule};
///
/// let mut lam = OptimizedSchedule::new(FixedDraw(0.0));
/// lam.init(100).unwrap();
/// assert!(lam.accept(5.0, 10.0).unwrap());
/// assert_eq!(lam.iteration_index(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct OptimizedSchedule<R = StdRng> {
    config: LamConfig,
    source: R,
    constants: Option<RunConstants>,
    run_length: u64,
    iteration: u64,
    temperature: f64,
    acceptance_rate: f64,
    target_rate: f64,

    // segment cursor
    entered: usize,
    next_entry: u64,
    floor: f64,
    term: f64,
    ratio: f64,
}

impl<R: UniformSource> OptimizedSchedule<R> {
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
            constants: None,
            run_length: 0,
            iteration: 0,
            entered: 0,
            next_entry: u64::MAX,
            floor: 0.0,
            term: 0.0,
            ratio: 1.0,
        }
    }

    /// The configuration this schedule was built with.
    pub fn config(&self) -> &LamConfig {
        &self.config
    }

    /// Constants cached for the current run length.
    pub fn run_constants(&self) -> Option<&RunConstants> {
        self.constants.as_ref()
    }

    /// Normalized progress `iteration_index / run_length`; 0 before `init`.
    pub fn progress(&self) -> f64 {
        self.constants
            .map_or(0.0, |c| self.iteration as f64 * c.inv_run_length)
    }

    /// Releases the random source.
    pub fn into_source(self) -> R {
        self.source
    }

    #[inline]
    fn enter_segments(&mut self, constants: &RunConstants) {
        while self.entered < SEGMENTS && self.iteration >= constants.entries[self.entered] {
            self.entered += 1;
        }
        let k = self.entered - 1;
        self.floor = LAM_CURVE[k].floor;
        self.term = constants.entry_terms[k];
        self.ratio = constants.ratios[k];
        self.next_entry = if self.entered < SEGMENTS {
            constants.entries[self.entered]
        } else {
            u64::MAX
        };
    }
}

impl OptimizedSchedule<StdRng> {
    /// Creates a schedule whose source is seeded from `config.seed`
    /// (or from entropy when no seed is set).
    pub fn from_config(config: LamConfig) -> Result<Self, ScheduleError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_config(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: UniformSource> AnnealingSchedule for OptimizedSchedule<R> {
    fn name(&self) -> &str {
        "ModifiedLamOptimized"
    }

    fn init(&mut self, run_length: i64) -> Result<(), ScheduleError> {
        let run_length = checked_run_length(run_length)?;
        let constants = match self.constants.filter(|c| c.run_length == run_length) {
            Some(c) => c,
            None => {
                let c = RunConstants::new(run_length);
                tracing::trace!(run_length, entries = ?c.entries, "recomputed run constants");
                self.constants = Some(c);
                c
            }
        };

        self.run_length = run_length;
        self.iteration = 0;
        self.temperature = self.config.initial_temperature;
        self.acceptance_rate = self.config.initial_acceptance_rate;
        self.target_rate = INITIAL_TARGET_RATE;

        self.entered = 0;
        self.next_entry = constants.entries[0];
        self.floor = 0.0;
        self.term = 0.0;
        self.ratio = 1.0;
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

        let accepted = candidate_cost <= current_cost
            || self.source.next_uniform()
                < ((current_cost - candidate_cost) / self.temperature).exp();

        self.acceptance_rate = if accepted {
            RATE_DECAY * self.acceptance_rate + RATE_GAIN
        } else {
            RATE_DECAY * self.acceptance_rate
        };

        self.iteration += 1;
        if self.iteration >= self.next_entry {
            if let Some(constants) = self.constants {
                self.enter_segments(&constants);
            }
        } else {
            self.term *= self.ratio;
        }
        self.target_rate = self.floor + self.term;

        // Divide rather than multiply by a cached reciprocal: the two round
        // differently and the reference divides.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lam::{FixedDraw, ReplayDraws};

    fn reference_phi_segment(i: u64, len: u64) -> usize {
        let phi = i as f64 / len as f64;
        LAM_CURVE
            .iter()
            .rposition(|s| !(phi < s.start))
            .unwrap_or(0)
    }

    #[test]
    fn test_entries_match_progress_test() {
        for len in [1u64, 2, 3, 7, 20, 100, 101, 999, 1000, 12_345] {
            let c = RunConstants::new(len);
            assert_eq!(c.entries[0], 1);
            for i in 1..=len {
                let expected = reference_phi_segment(i, len);
                let got = c.entries.iter().rposition(|&e| e <= i).unwrap_or(0);
                assert_eq!(got, expected, "len={len} i={i}");
            }
        }
    }

    #[test]
    fn test_entries_for_round_lengths() {
        let c = RunConstants::new(1000);
        assert_eq!(c.entries, [1, 150, 650]);
        assert!((c.inv_run_length - 0.001).abs() < 1e-18);
    }

    #[test]
    fn test_entries_for_single_step_run() {
        let c = RunConstants::new(1);
        assert_eq!(c.entries, [1, 1, 1]);
    }

    #[test]
    fn test_plateau_ratio_is_exactly_one() {
        let c = RunConstants::new(777);
        assert_eq!(c.ratios[1], 1.0);
        assert_eq!(c.entry_terms[1], 0.0);
    }

    #[test]
    fn test_ratio_accumulates_full_decay() {
        // across the whole first segment the term falls by the base (560)
        let len = 10_000u64;
        let c = RunConstants::new(len);
        let steps = (0.15 * len as f64) as i32;
        let total = c.ratios[0].powi(steps);
        assert!((total - 1.0 / 560.0).abs() < 1e-9, "got {total}");
    }

    #[test]
    fn test_constants_reused_across_restarts() {
        let mut lam = OptimizedSchedule::new(FixedDraw(0.0));
        lam.init(500).unwrap();
        let first = *lam.run_constants().unwrap();
        for _ in 0..500 {
            lam.accept(1.0, 0.0).unwrap();
        }
        lam.init(500).unwrap();
        assert_eq!(*lam.run_constants().unwrap(), first);

        lam.init(600).unwrap();
        assert_eq!(lam.run_constants().unwrap().run_length, 600);
        assert_eq!(lam.run_length(), 600);
    }

    #[test]
    fn test_init_resets_state() {
        let mut lam = OptimizedSchedule::new(FixedDraw(0.0));
        lam.init(10).unwrap();
        for _ in 0..10 {
            lam.accept(2.0, 1.0).unwrap();
        }
        lam.init(20).unwrap();
        assert_eq!(lam.iteration_index(), 0);
        assert_eq!(lam.temperature(), 0.5);
        assert_eq!(lam.acceptance_rate(), 0.5);
        assert_eq!(lam.target_rate(), 1.0);
        assert_eq!(lam.progress(), 0.0);
    }

    #[test]
    fn test_invalid_run_length_keeps_cache() {
        let mut lam = OptimizedSchedule::new(FixedDraw(0.0));
        lam.init(40).unwrap();
        assert_eq!(
            lam.init(0),
            Err(ScheduleError::InvalidArgument { run_length: 0 })
        );
        assert_eq!(
            lam.init(-5),
            Err(ScheduleError::InvalidArgument { run_length: -5 })
        );
        assert_eq!(lam.run_length(), 40);
    }

    #[test]
    fn test_accept_before_init() {
        let mut lam = OptimizedSchedule::new(FixedDraw(0.0));
        assert_eq!(
            lam.accept(0.0, 0.0),
            Err(ScheduleError::OutOfSequence(SequenceViolation::NotInitialized))
        );
        assert_eq!(lam.run_length(), 0);
    }

    #[test]
    fn test_accept_past_run_length() {
        let mut lam = OptimizedSchedule::new(FixedDraw(0.0));
        lam.init(2).unwrap();
        lam.accept(0.0, 0.0).unwrap();
        lam.accept(0.0, 0.0).unwrap();
        assert_eq!(
            lam.accept(0.0, 0.0),
            Err(ScheduleError::OutOfSequence(
                SequenceViolation::RunExhausted { run_length: 2 }
            ))
        );
    }

    #[test]
    fn test_progress_tracks_calls() {
        let mut lam = OptimizedSchedule::new(FixedDraw(0.5));
        lam.init(4).unwrap();
        for k in 1..=4u64 {
            lam.accept(1.0, 1.0).unwrap();
            assert!((lam.progress() - k as f64 / 4.0).abs() < 1e-15);
        }
    }

    #[test]
    fn test_target_rate_hits_segment_values() {
        let mut lam = OptimizedSchedule::new(FixedDraw(0.0));
        lam.init(1000).unwrap();
        for i in 1..=1000u64 {
            lam.accept(0.0, 0.0).unwrap();
            let t = lam.target_rate();
            if (150..650).contains(&i) {
                assert_eq!(t, 0.44);
            }
            if i == 650 {
                assert!((t - 0.44).abs() < 1e-12);
            }
        }
        assert!((lam.target_rate() - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_improving_moves_do_not_draw() {
        let mut lam = OptimizedSchedule::new(ReplayDraws::new(vec![0.5]));
        lam.init(30).unwrap();
        for _ in 0..30 {
            assert!(lam.accept(1.0, 2.0).unwrap());
        }
        assert_eq!(lam.into_source().taken(), 0);
    }

    #[test]
    fn test_huge_delta_rejected() {
        let mut lam = OptimizedSchedule::new(FixedDraw(0.0));
        lam.init(10).unwrap();
        assert!(!lam.accept(f64::INFINITY, 0.0).unwrap());
        assert!(!lam.accept(1e308, -1e308).unwrap());
        assert!(!lam.accept(f64::NAN, 0.0).unwrap());
    }

    #[test]
    fn test_equal_infinite_costs_accepted_without_draw() {
        let mut lam = OptimizedSchedule::new(ReplayDraws::new(vec![0.0]));
        lam.init(10).unwrap();
        assert!(lam.accept(f64::INFINITY, f64::INFINITY).unwrap());
        assert!(lam.accept(f64::NEG_INFINITY, f64::NEG_INFINITY).unwrap());
        assert!((lam.acceptance_rate() - (0.998 * (0.998 * 0.5 + 0.002) + 0.002)).abs() < 1e-15);
        assert_eq!(lam.into_source().taken(), 0);
    }

    #[test]
    fn test_temperature_clamped() {
        let config = LamConfig::default()
            .with_min_temperature(0.4)
            .with_max_temperature(0.6);
        let mut lam = OptimizedSchedule::with_config(config, FixedDraw(0.0)).unwrap();
        lam.init(100_000).unwrap();
        for _ in 0..100_000 {
            lam.accept(0.0, 0.0).unwrap();
            assert!((0.4..=0.6).contains(&lam.temperature()));
        }
    }

    #[test]
    fn test_largest_run_length() {
        let mut lam = OptimizedSchedule::new(FixedDraw(0.0));
        lam.init(i64::MAX).unwrap();
        let c = *lam.run_constants().unwrap();
        assert_eq!(c.run_length, i64::MAX as u64);
        assert_eq!(c.entries[0], 1);
        assert!(c.entries.windows(2).all(|w| w[0] <= w[1]));
        assert!(c.entries[SEGMENTS - 1] <= c.run_length);
        for _ in 0..1000 {
            lam.accept(1.0, 0.0).unwrap();
        }
        assert_eq!(lam.iteration_index(), 1000);
        assert!(lam.target_rate() > 0.99 && lam.target_rate() <= 1.0);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = LamConfig::default().with_initial_acceptance_rate(-0.1);
        let result = OptimizedSchedule::with_config(config, FixedDraw(0.0));
        assert!(matches!(result, Err(ScheduleError::InvalidConfig(_))));
    }
}
