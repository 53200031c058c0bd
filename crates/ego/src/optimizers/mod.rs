//! # Optimizers Module
//!
//! This module provides the local optimization backend used to maximize the
//! infill criterion from each multistart point.
//!
//! ## Available Optimizers
//!
//! - **L-BFGS** - quasi-Newton method from `argmin` with a More-Thuente line search.
//!   Bounds are handled by evaluating the function on clamped parameters and by
//!   projecting the gradient on active bounds. Gradients are approximated with
//!   central differences so the optimized function only needs to be evaluable.

mod optimizer;

pub(crate) use optimizer::*;
