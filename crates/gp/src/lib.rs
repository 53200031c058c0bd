//! This library implements Gaussian process regression with fixed hyperparameters,
//! meant to be used as the surrogate oracle of a sequential optimizer.
//!
//! Contrary to a classic kriging implementation, the hyperparameters (length scale,
//! output scale, noise level, prior mean) are not estimated from data: they are
//! configuration constants reflecting prior knowledge about the modeled function.
//! Training only factorizes the covariance of the training data.
//!
//! The covariance function reads:
//!
//! `k(x, x') = s * corr(|x - x'| / l) + noise * delta(x, x')`
//!
//! where `corr` is one of the [correlation_models], and the prior process has a
//! constant mean `m`.
//!
//! # Example
//!
//! ```
//! use safebo_gp::{correlation_models::Matern52Corr, GaussianProcess, Surrogate, SurrogateBuilder};
//! use ndarray::array;
//!
//! let xt = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
//! let yt = array![0.0, 1.0, 1.5, 0.9, 1.0];
//!
//! let builder = GaussianProcess::params(Matern52Corr::new(0.5))
//!     .output_scale(1.0)
//!     .noise_level(1e-4);
//! let gp = builder.train(xt.view(), yt.view()).expect("GP training");
//!
//! let (mean, std) = gp.predict(&array![1.5].view()).expect("GP prediction");
//! assert!(std > 0.);
//! assert!(mean > 0.);
//! ```
mod algorithm;
pub mod correlation_models;
mod errors;
mod parameters;
mod surrogate_builder;

pub use algorithm::*;
pub use errors::*;
pub use parameters::*;
pub use surrogate_builder::*;
