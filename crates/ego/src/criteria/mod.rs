//! Infill criteria used to select the next point to evaluate.
//!
//! A criterion is a merit function to be maximized over the design space,
//! computed from the posterior of the objective and constraint surrogates.

mod cei;

pub use cei::*;

use crate::errors::Result;
use crate::types::InfillObjData;
use ndarray::ArrayView1;
use safebo_gp::Surrogate;
use std::fmt;

/// A trait for infill criteria to be maximized
pub trait InfillCriterion: Clone + Send + Sync + fmt::Debug {
    /// Name of the infill criterion
    fn name(&self) -> &'static str;

    /// Criterion value at `x` given the objective and constraint surrogates
    fn value(
        &self,
        x: &ArrayView1<f64>,
        obj_model: &dyn Surrogate,
        cstr_model: &dyn Surrogate,
        infill_data: &InfillObjData,
    ) -> Result<f64>;
}
