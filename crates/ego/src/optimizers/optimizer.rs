use crate::utils::clip_slice;

use argmin::core::{
    CostFunction, Error, Executor, Gradient, State, TerminationReason, TerminationStatus,
};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use log::debug;
use ndarray::{Array1, Array2};

/// Gradient tolerance of the local optimization
const TOL_GRAD: f64 = 1e-8;

const BOUND_EPS: f64 = 1e-12;

/// Outcome of a local minimization
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LocalOptimResult {
    /// Best point found, within bounds
    pub x: Array1<f64>,
    /// Function value at `x`
    pub value: f64,
    /// Whether the solver reported convergence
    pub converged: bool,
}

/// Central differences gradient with step `eps_i = 1e-8 * max(|x_i|, 1)`
fn central_diff(fun: &dyn Fn(&[f64]) -> f64, x: &[f64]) -> Vec<f64> {
    let mut xk = x.to_vec();
    let mut grad = vec![0.; x.len()];
    for i in 0..x.len() {
        let eps = 1e-8 * x[i].abs().max(1.);
        xk[i] = x[i] + eps;
        let f_plus = fun(&xk);
        xk[i] = x[i] - eps;
        let f_minus = fun(&xk);
        xk[i] = x[i];
        grad[i] = (f_plus - f_minus) / (2. * eps);
    }
    grad
}

/// Bound constrained problem wrapper for argmin
struct BoundedProblem<'a> {
    fun: &'a dyn Fn(&[f64]) -> f64,
    bounds: &'a Array2<f64>,
}

impl CostFunction for BoundedProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let x = clip_slice(param, self.bounds);
        Ok((self.fun)(&x))
    }
}

impl Gradient for BoundedProblem<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, Error> {
        let x = clip_slice(param, self.bounds);
        let mut grad = central_diff(self.fun, &x);
        // Do not push further against an active bound
        for (i, lims) in self.bounds.rows().into_iter().enumerate() {
            if (x[i] <= lims[0] + BOUND_EPS && grad[i] > 0.)
                || (x[i] >= lims[1] - BOUND_EPS && grad[i] < 0.)
            {
                grad[i] = 0.;
            }
        }
        Ok(grad)
    }
}

/// Local bound constrained minimizer of a function `fun: R^nx -> R`
pub(crate) struct Optimizer<'a> {
    fun: &'a dyn Fn(&[f64]) -> f64,
    bounds: &'a Array2<f64>,
    xinit: Option<Array1<f64>>,
    max_iters: u64,
    memory: usize,
}

impl<'a> Optimizer<'a> {
    pub fn new(fun: &'a dyn Fn(&[f64]) -> f64, bounds: &'a Array2<f64>) -> Self {
        Optimizer {
            fun,
            bounds,
            xinit: None,
            max_iters: 100,
            memory: 10,
        }
    }

    /// Starting point, defaults to the middle of the bounds
    pub fn xinit(mut self, xinit: &Array1<f64>) -> Self {
        self.xinit = Some(xinit.to_owned());
        self
    }

    pub fn max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn memory(mut self, memory: usize) -> Self {
        self.memory = memory;
        self
    }

    /// Minimize the function within bounds.
    ///
    /// Solver failures are not reported as errors: the starting point is
    /// returned as a non converged result instead.
    pub fn minimize(&self) -> LocalOptimResult {
        let xinit = self.xinit.clone().unwrap_or_else(|| {
            self.bounds
                .rows()
                .into_iter()
                .map(|lims| 0.5 * (lims[0] + lims[1]))
                .collect()
        });
        let x0 = clip_slice(&xinit.to_vec(), self.bounds);
        let start = LocalOptimResult {
            x: Array1::from_vec(x0.clone()),
            value: (self.fun)(&x0),
            converged: false,
        };

        let problem = BoundedProblem {
            fun: self.fun,
            bounds: self.bounds,
        };
        let linesearch = MoreThuenteLineSearch::new();
        let solver = match LBFGS::new(linesearch, self.memory).with_tolerance_grad(TOL_GRAD) {
            Ok(solver) => solver,
            Err(err) => {
                debug!("L-BFGS setup failed: {err}");
                return start;
            }
        };

        match Executor::new(problem, solver)
            .configure(|state| state.param(x0).max_iters(self.max_iters))
            .run()
        {
            Ok(res) => {
                let state = res.state();
                let converged = matches!(
                    state.get_termination_status(),
                    TerminationStatus::Terminated(TerminationReason::SolverConverged)
                );
                let x = state
                    .get_best_param()
                    .map(|p| clip_slice(p, self.bounds))
                    .unwrap_or_else(|| start.x.to_vec());
                let value = (self.fun)(&x);
                if value.is_nan() || value > start.value {
                    // best param is tracked on unclamped cost, keep the start when it is better
                    return LocalOptimResult { converged, ..start };
                }
                LocalOptimResult {
                    x: Array1::from_vec(x),
                    value,
                    converged,
                }
            }
            Err(err) => {
                debug!("L-BFGS run from {:?} failed: {err}", start.x.as_slice());
                start
            }
        }
    }
}
