//! Safe EGO optimizer configuration

use crate::errors::{EgoError, Result};
use crate::surrogates::{default_constraint_gp, default_objective_gp};

use ndarray::{array, Array2};
use safebo_gp::{correlation_models::Matern52Corr, GpParams};
use serde::{Deserialize, Serialize};

/// Default safety threshold on constraint values
pub const DEFAULT_V_MIN: f64 = 1.2;
/// Default exploration margin of the expected improvement
pub const DEFAULT_F_SLACK: f64 = 0.01;
/// Default margin on the safety threshold used by the probability of feasibility
pub const DEFAULT_V_SLACK: f64 = 0.;
/// Default number of multistart local optimizations of the infill criterion
pub const DEFAULT_N_START: usize = 20;
/// Default iteration cap of each local optimization
pub const DEFAULT_MAX_LOCAL_ITERS: u64 = 100;
/// Default L-BFGS history size
pub const DEFAULT_LBFGS_MEMORY: usize = 10;

/// A structure to handle the safe EGO optimizer configuration
/// built with chained setters and validated with [`SafeBoConfig::check()`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SafeBoConfig<SB = GpParams<Matern52Corr>> {
    /// Design space as a (nx, 2) matrix of [lower, upper] bounds
    pub(crate) xlimits: Array2<f64>,
    /// Constraint values greater or equal than `v_min` are feasible
    pub(crate) v_min: f64,
    /// Exploration margin on the objective improvement
    pub(crate) f_slack: f64,
    /// Margin added to `v_min` in the probability of feasibility
    pub(crate) v_slack: f64,
    /// Number of random restarts of the infill criterion optimization
    pub(crate) n_start: usize,
    /// Iteration cap of each local optimization
    pub(crate) max_local_iters: u64,
    /// Number of correction pairs kept by L-BFGS
    pub(crate) lbfgs_memory: usize,
    /// Random generator seed for reproducibility
    pub(crate) seed: Option<u64>,
    /// Objective surrogate configuration
    pub(crate) objective_gp: SB,
    /// Constraint surrogate configuration
    pub(crate) constraint_gp: SB,
}

impl Default for SafeBoConfig<GpParams<Matern52Corr>> {
    fn default() -> Self {
        SafeBoConfig::with_surrogates(default_objective_gp(), default_constraint_gp())
    }
}

impl<SB> SafeBoConfig<SB> {
    /// Configuration with default settings and the given surrogate configurations
    pub fn with_surrogates(objective_gp: SB, constraint_gp: SB) -> Self {
        SafeBoConfig {
            xlimits: array![[0., 1.]],
            v_min: DEFAULT_V_MIN,
            f_slack: DEFAULT_F_SLACK,
            v_slack: DEFAULT_V_SLACK,
            n_start: DEFAULT_N_START,
            max_local_iters: DEFAULT_MAX_LOCAL_ITERS,
            lbfgs_memory: DEFAULT_LBFGS_MEMORY,
            seed: None,
            objective_gp,
            constraint_gp,
        }
    }

    /// Sets the design space as a (nx, 2) matrix of [lower, upper] bounds
    pub fn xlimits(mut self, xlimits: &Array2<f64>) -> Self {
        self.xlimits = xlimits.to_owned();
        self
    }

    /// Sets the safety threshold: constraint values `v >= v_min` are feasible
    pub fn v_min(mut self, v_min: f64) -> Self {
        self.v_min = v_min;
        self
    }

    /// Sets the exploration margin of the expected improvement
    pub fn f_slack(mut self, f_slack: f64) -> Self {
        self.f_slack = f_slack;
        self
    }

    /// Sets the margin on the safety threshold in the probability of feasibility
    pub fn v_slack(mut self, v_slack: f64) -> Self {
        self.v_slack = v_slack;
        self
    }

    /// Sets the number of random restarts of the infill optimization
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.n_start = n_start;
        self
    }

    /// Sets the maximum number of iterations of each local optimization
    pub fn max_local_iters(mut self, max_local_iters: u64) -> Self {
        self.max_local_iters = max_local_iters;
        self
    }

    /// Sets the L-BFGS history size
    pub fn lbfgs_memory(mut self, lbfgs_memory: usize) -> Self {
        self.lbfgs_memory = lbfgs_memory;
        self
    }

    /// Allow to specify a seed for random number generator to allow
    /// reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the objective surrogate configuration
    pub fn objective_gp(mut self, objective_gp: SB) -> Self {
        self.objective_gp = objective_gp;
        self
    }

    /// Sets the constraint surrogate configuration
    pub fn constraint_gp(mut self, constraint_gp: SB) -> Self {
        self.constraint_gp = constraint_gp;
        self
    }

    /// Check configuration consistency and returns a validated configuration
    pub fn check(self) -> Result<ValidSafeBoConfig<SB>> {
        if self.xlimits.ncols() != 2 || self.xlimits.nrows() == 0 {
            return Err(EgoError::InvalidConfig(format!(
                "xlimits should be a (nx, 2) matrix with nx > 0, got {:?}",
                self.xlimits.dim()
            )));
        }
        for (i, lims) in self.xlimits.rows().into_iter().enumerate() {
            if !(lims[0].is_finite() && lims[1].is_finite() && lims[0] < lims[1]) {
                return Err(EgoError::InvalidConfig(format!(
                    "bounds of component {i} should be finite with lower < upper, got [{}, {}]",
                    lims[0], lims[1]
                )));
            }
        }
        if !self.v_min.is_finite() {
            return Err(EgoError::InvalidConfig(format!(
                "v_min should be finite, got {}",
                self.v_min
            )));
        }
        if !(self.f_slack.is_finite() && self.f_slack >= 0.) {
            return Err(EgoError::InvalidConfig(format!(
                "f_slack should be non negative, got {}",
                self.f_slack
            )));
        }
        if !(self.v_slack.is_finite() && self.v_slack >= 0.) {
            return Err(EgoError::InvalidConfig(format!(
                "v_slack should be non negative, got {}",
                self.v_slack
            )));
        }
        if self.n_start == 0 {
            return Err(EgoError::InvalidConfig(
                "n_start should be at least 1".to_string(),
            ));
        }
        if self.max_local_iters == 0 {
            return Err(EgoError::InvalidConfig(
                "max_local_iters should be at least 1".to_string(),
            ));
        }
        if self.lbfgs_memory == 0 {
            return Err(EgoError::InvalidConfig(
                "lbfgs_memory should be at least 1".to_string(),
            ));
        }
        Ok(ValidSafeBoConfig(self))
    }
}

/// A validated safe EGO configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidSafeBoConfig<SB = GpParams<Matern52Corr>>(pub(crate) SafeBoConfig<SB>);

impl<SB> ValidSafeBoConfig<SB> {
    pub fn xlimits(&self) -> &Array2<f64> {
        &self.0.xlimits
    }

    /// Input dimension
    pub fn dim(&self) -> usize {
        self.0.xlimits.nrows()
    }

    pub fn v_min(&self) -> f64 {
        self.0.v_min
    }

    pub fn f_slack(&self) -> f64 {
        self.0.f_slack
    }

    pub fn v_slack(&self) -> f64 {
        self.0.v_slack
    }

    pub fn n_start(&self) -> usize {
        self.0.n_start
    }

    pub fn max_local_iters(&self) -> u64 {
        self.0.max_local_iters
    }

    pub fn lbfgs_memory(&self) -> usize {
        self.0.lbfgs_memory
    }

    pub fn seed(&self) -> Option<u64> {
        self.0.seed
    }

    pub fn objective_gp(&self) -> &SB {
        &self.0.objective_gp
    }

    pub fn constraint_gp(&self) -> &SB {
        &self.0.constraint_gp
    }
}
