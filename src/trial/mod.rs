//! Schedule-only timing trials.
//!
//! Drives an [`AnnealingSchedule`](crate::lam::AnnealingSchedule) in
//! isolation from any search loop: the schedule is initialized for a run
//! length and then asked to judge a fixed synthetic stream of moves, over
//! several restarts. Restarts of the same length are where the cached run
//! constants of the optimized variant pay off.
//!
//! A matched comparison runs both variants with identically seeded random
//! sources, so equal accept counts double as an equivalence check.

mod config;
mod runner;

pub use config::TrialConfig;
pub use runner::{synthetic_candidate, Comparison, TrialResult, TrialRunner};
