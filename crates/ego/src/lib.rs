//! This library implements a safe constrained Bayesian optimizer, an EGO-like
//! algorithm where the objective to maximize is only trusted at points where a
//! constraint function reaches a safety threshold.
//!
//! Both the objective `f` and the constraint `v` are black boxes evaluated by the
//! caller. Each of them is approximated by a Gaussian process surrogate refitted
//! on the whole history after every evaluation. The next point to evaluate
//! maximizes the expected improvement of the objective weighted by the
//! probability of feasibility `P(v(x) >= v_min)`.
//!
//! The optimizer is used as a service with an ask-and-tell interface:
//!
//! ```no_run
//! use ndarray::array;
//! use safebo_ego::{SafeBoConfig, SafeBoService};
//!
//! # fn main() -> safebo_ego::Result<()> {
//! let config = SafeBoConfig::default()
//!     .xlimits(&array![[0., 5.]])
//!     .v_min(1.2)
//!     .seed(0)
//!     .check()?;
//! let mut service = SafeBoService::new(config);
//!
//! service.add_observation(&array![1.], -1.5, 2.0)?;
//! for _ in 0..10 {
//!     let x = service.next_point()?;
//!     let (f, v) = (-(x[0] - 2.5).abs(), 2.0);
//!     service.add_observation(&x, f, v)?;
//! }
//! println!("Solution {}", service.best_answer()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Surrogates
//!
//! Default surrogates are Gaussian processes with fixed hyperparameters and a
//! Matern 5/2 correlation of length scale 0.25:
//!
//! * objective: zero prior mean, output scale 0.5, white noise 0.15,
//! * constraint: prior mean 1.5, output scale sqrt(2), white noise 1e-4.
//!
//! Any [`safebo_gp::SurrogateBuilder`] can be used instead with
//! [`SafeBoConfig::with_surrogates()`].
//!
//! # Logging
//!
//! Logs are emitted with the `log` crate and printed on stdout by `env_logger`
//! when no logger is installed yet. The level is controlled with the `SAFEBO_LOG`
//! environment variable, for instance `SAFEBO_LOG=debug`.
//!
//! # Reproducibility
//!
//! Given a seed, the sequence of proposed points only depends on the recorded
//! observations: multistart points are drawn from a `Xoshiro256Plus` generator
//! and parallel local optimizations are reduced in start order.

pub mod criteria;
pub mod errors;
mod optimizers;
mod solver;
pub mod surrogates;
mod types;
pub mod utils;

pub use crate::errors::*;
pub use crate::solver::*;
pub use crate::types::*;
