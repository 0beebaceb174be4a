//! Modified Lam annealing schedule, in a reference and an optimized form.
//!
//! - **Modified Lam (`lam`)**: adaptive temperature control for simulated
//!   annealing. The schedule steers its observed acceptance rate along a
//!   fixed target curve over the run. [`lam::ReferenceSchedule`] evaluates
//!   the published rule directly; [`lam::OptimizedSchedule`] caches every
//!   run-length constant in `init` and makes the same decisions with a
//!   cheaper per-call path.
//! - **Trials (`trial`)**: schedule-only harness that times both variants
//!   over restarted runs and checks that they accept the same moves.
//!
//! # Architecture
//!
//! The schedule sits below any search loop: the caller owns the solution,
//! the neighborhood and the cost function, and asks the schedule only
//! whether to accept a candidate of a given cost. Randomness comes from a
//! source owned by each schedule instance, never from global state, so
//! independent instances can be compared draw for draw on separate threads.

pub mod lam;
pub mod trial;
