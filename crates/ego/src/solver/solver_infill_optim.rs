use crate::criteria::InfillCriterion;
use crate::errors::{EgoError, Result};
use crate::optimizers::{LocalOptimResult, Optimizer};
use crate::types::InfillObjData;
use crate::utils::clip_to_bounds;

use log::{debug, warn};
use ndarray::{aview1, Array1, Array2, Zip};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rayon::prelude::*;
use safebo_gp::Surrogate;

/// A trait for multistart strategies of the infill criterion optimization
pub(crate) trait MultiStarter {
    /// Returns `n_start` starting points as a (n_start, nx) matrix
    fn multistart(&mut self, n_start: usize) -> Array2<f64>;
}

/// Multistart strategy drawing points uniformly over the whole design space
pub(crate) struct GlobalMultiStarter<R: Rng + Clone> {
    xlimits: Array2<f64>,
    rng: R,
}

impl<R: Rng + Clone> GlobalMultiStarter<R> {
    pub fn new(xlimits: &Array2<f64>, rng: R) -> Self {
        GlobalMultiStarter {
            xlimits: xlimits.to_owned(),
            rng,
        }
    }
}

impl<R: Rng + Clone> MultiStarter for GlobalMultiStarter<R> {
    fn multistart(&mut self, n_start: usize) -> Array2<f64> {
        let nx = self.xlimits.nrows();
        let mut xstart =
            Array2::random_using((n_start, nx), Uniform::new(0., 1.), &mut self.rng);
        Zip::from(xstart.columns_mut())
            .and(self.xlimits.rows())
            .for_each(|mut col, lims| col.mapv_inplace(|u| lims[0] + u * (lims[1] - lims[0])));
        xstart
    }
}

/// Infill criterion optimization problem
pub(crate) struct InfillOptProblem<'a, C: InfillCriterion> {
    pub criterion: &'a C,
    pub obj_model: &'a dyn Surrogate,
    pub cstr_model: &'a dyn Surrogate,
    pub infill_data: &'a InfillObjData,
}

impl<'a, C: InfillCriterion> InfillOptProblem<'a, C> {
    pub fn new(
        criterion: &'a C,
        obj_model: &'a dyn Surrogate,
        cstr_model: &'a dyn Surrogate,
        infill_data: &'a InfillObjData,
    ) -> Self {
        InfillOptProblem {
            criterion,
            obj_model,
            cstr_model,
            infill_data,
        }
    }

    /// Criterion value at `x`
    pub fn value(&self, x: &[f64]) -> Result<f64> {
        self.criterion
            .value(&aview1(x), self.obj_model, self.cstr_model, self.infill_data)
    }

    /// Function to be minimized by local optimizers, NaN when the criterion fails
    fn negated(&self, x: &[f64]) -> f64 {
        match self.value(x) {
            Ok(v) => -v,
            Err(err) => {
                warn!("{} evaluation failed at {:?}: {err}", self.criterion.name(), x);
                f64::NAN
            }
        }
    }
}

/// Local optimization settings applied from every start point
#[derive(Clone, Copy, Debug)]
pub(crate) struct LocalOptimSettings {
    pub max_iters: u64,
    pub memory: usize,
}

/// Maximize the infill criterion with local optimizations run in parallel from
/// the starting points given by `multistarter`.
///
/// Returns the best criterion value and its location clipped to `xlimits`.
/// The result only depends on the starting points: local results are collected
/// in start order and ties keep the first start.
pub(crate) fn optimize_infill_criterion<C: InfillCriterion, MS: MultiStarter>(
    problem: &InfillOptProblem<C>,
    mut multistarter: MS,
    xlimits: &Array2<f64>,
    n_start: usize,
    settings: LocalOptimSettings,
    n_obs: usize,
) -> Result<(f64, Array1<f64>)> {
    let x_start = multistarter.multistart(n_start);
    let starts: Vec<Array1<f64>> = x_start.rows().into_iter().map(|r| r.to_owned()).collect();

    let results: Vec<LocalOptimResult> = starts
        .par_iter()
        .map(|x0| {
            let fun = |x: &[f64]| problem.negated(x);
            Optimizer::new(&fun, xlimits)
                .xinit(x0)
                .max_iters(settings.max_iters)
                .memory(settings.memory)
                .minimize()
        })
        .collect();

    let n_converged = results.iter().filter(|r| r.converged).count();
    debug!("{n_converged}/{} local optimizations converged", results.len());

    let mut best: Option<&LocalOptimResult> = None;
    for res in results.iter().filter(|r| r.value.is_finite()) {
        if best.map_or(true, |b| res.value < b.value) {
            best = Some(res);
        }
    }
    match best {
        Some(res) => {
            let value = -res.value;
            debug!("{} max = {value} at {}", problem.criterion.name(), res.x);
            Ok((value, clip_to_bounds(&res.x, xlimits)))
        }
        None => Err(EgoError::OptimizerExhausted { n_start, n_obs }),
    }
}
