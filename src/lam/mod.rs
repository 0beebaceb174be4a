//! Modified Lam annealing schedule.
//!
//! An adaptive temperature control rule for simulated annealing. Instead of
//! following a fixed cooling curve, the schedule watches a moving average
//! of its own accept/reject decisions and nudges the temperature up or down
//! so that the average tracks a target acceptance rate that falls over the
//! course of the run.
//!
//! Two interchangeable variants implement [`AnnealingSchedule`]:
//!
//! - [`ReferenceSchedule`]: the published rule, evaluated from scratch on
//!   every call.
//! - [`OptimizedSchedule`]: same decisions for the same costs and draws,
//!   with run-length constants cached in `init`.
//!
//! # References
//!
//! - Lam & Delosme (1988), "An efficient simulated annealing schedule"
//! - Boyan (1998), "Learning Evaluation Functions for Global Optimization"
//! - Cicirello (2020), "Optimizing the Modified Lam Annealing Schedule"

mod config;
pub mod curve;
mod optimized;
mod reference;
mod types;

pub use config::LamConfig;
pub use optimized::{OptimizedSchedule, RunConstants};
pub use reference::ReferenceSchedule;
pub use types::{
    AnnealingSchedule, FixedDraw, ReplayDraws, ScheduleError, SequenceViolation, UniformSource,
};
