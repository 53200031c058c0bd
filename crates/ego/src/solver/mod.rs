//! # Solver Module - Safe EGO Optimizer Implementation
//!
//! This module contains the sequential recommendation engine of the safe
//! constrained Bayesian optimizer.
//!
//! ## Architecture Overview
//!
//! ### Public API
//!
//! - [`SafeBoConfig`] / [`ValidSafeBoConfig`] - Configuration builder and validated config
//! - [`SafeBoService`] - Ask-and-tell interface: the caller evaluates the proposed points
//! - [`ObservationStore`] - Append-only history of evaluated points
//!
//! ### Internal Implementation
//!
//! - [`solver_infill_optim`] - Multistart maximization of the infill criterion:
//!   uniform random start points drawn from the seeded generator, local L-BFGS
//!   optimizations run in parallel with `rayon`, best result clipped to the domain.
//!
//! ## Iteration
//!
//! Each step of the optimization loop driven by the caller:
//!
//! 1. `next_point()` maximizes `EI(x) * PoF(x)` where `EI` is the expected
//!    improvement over the best recorded objective value and `PoF` the probability
//!    for the constraint to reach the safety threshold `v_min`,
//! 2. the caller evaluates the objective `f` and the constraint `v` at the point,
//! 3. `add_observation()` records the evaluation and refits both surrogates.
//!
//! At any time `best_answer()` returns the best point among safe observations.

mod config;
mod observation_store;
mod service;
pub(crate) mod solver_infill_optim;

pub use config::*;
pub use observation_store::*;
pub use service::*;
