//! Target acceptance curve and acceptance-rate constants.
//!
//! This table is the only thing the two schedule variants share. Any edit
//! here changes both of them at once.

/// One piece of the target acceptance curve.
///
/// Over `[start, start + width)` the target rate is
/// `floor + amplitude * base^(-(phi - start) / width)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSegment {
    /// Normalized progress at which this segment becomes active.
    pub start: f64,
    /// Nominal length of the segment in normalized progress.
    pub width: f64,
    /// Constant part of the rate.
    pub floor: f64,
    /// Decaying part of the rate at `phi == start`.
    pub amplitude: f64,
    /// Decay base; the decaying part falls by a factor of `base` over `width`.
    pub base: f64,
}

impl CurveSegment {
    /// Decaying part of the rate at progress `phi`.
    #[inline]
    pub fn term_at(&self, phi: f64) -> f64 {
        self.amplitude * self.base.powf(-(phi - self.start) / self.width)
    }

    /// Target rate at progress `phi`.
    #[inline]
    pub fn rate_at(&self, phi: f64) -> f64 {
        self.floor + self.term_at(phi)
    }
}

/// Number of pieces in [`LAM_CURVE`].
pub const SEGMENT_COUNT: usize = 3;

/// The Modified Lam target acceptance curve.
///
/// Starts at 1.0, decays exponentially to 0.44 during the first 15% of
/// the run, holds 0.44 until 65%, then decays exponentially to 0.001 at
/// the end of the run.
///
/// # References
///
/// - Lam & Delosme (1988), "An efficient simulated annealing schedule"
/// - Swartz & Boyan (1998), modified form with a fixed run length
pub static LAM_CURVE: [CurveSegment; SEGMENT_COUNT] = [
    CurveSegment {
        start: 0.0,
        width: 0.15,
        floor: 0.44,
        amplitude: 0.56,
        base: 560.0,
    },
    CurveSegment {
        start: 0.15,
        width: 0.5,
        floor: 0.44,
        amplitude: 0.0,
        base: 1.0,
    },
    CurveSegment {
        start: 0.65,
        width: 0.35,
        floor: 0.0,
        amplitude: 0.44,
        base: 440.0,
    },
];

/// Target rate reported before the first `accept` of a run (curve at phi = 0).
pub const INITIAL_TARGET_RATE: f64 = 1.0;

/// Decay factor of the acceptance-rate moving average.
pub const RATE_DECAY: f64 = 0.998;

/// Amount added to the moving average for an accepted move.
pub const RATE_GAIN: f64 = 0.002;
