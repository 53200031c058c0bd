use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// An evaluated point: input `x`, objective value `f` and constraint value `v`.
///
/// Observations are immutable once recorded by the optimizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    x: Array1<f64>,
    f: f64,
    v: f64,
}

impl Observation {
    pub fn new(x: Array1<f64>, f: f64, v: f64) -> Self {
        Observation { x, f, v }
    }

    /// Input point
    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    /// Objective value
    pub fn f(&self) -> f64 {
        self.f
    }

    /// Constraint value
    pub fn v(&self) -> f64 {
        self.v
    }

    /// Whether the constraint value reaches the safety threshold `v_min`
    pub fn is_feasible(&self, v_min: f64) -> bool {
        self.v >= v_min
    }
}

/// Data used by the infill criterion evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfillObjData {
    /// Incumbent: best objective value observed so far (feasible or not)
    pub f_best: f64,
    /// Safety threshold of the constraint
    pub v_min: f64,
    /// Exploration margin on the objective improvement
    pub f_slack: f64,
    /// Margin on the constraint threshold
    pub v_slack: f64,
}

impl Default for InfillObjData {
    fn default() -> Self {
        Self {
            f_best: f64::NEG_INFINITY,
            v_min: 0.,
            f_slack: 0.,
            v_slack: 0.,
        }
    }
}
