//! A module for correlation models with fixed length scale.
//!
//! The following correlation models are implemented:
//! * squared exponential,
//! * matern 3/2,
//! * matern 5/2.
//!
//! Each model is a stationary function of the euclidean distance between two points
//! scaled by a length scale `l`: `r = |x - x'| / l`.

use ndarray::{Array2, ArrayBase, ArrayView1, Data, Ix2, Zip};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

const SQRT_3: f64 = 1.732_050_807_568_877_2;
const SQRT_5: f64 = 2.236_067_977_499_79;

/// A trait for stationary correlation models parameterized by a length scale.
pub trait CorrelationModel: Clone + Copy + fmt::Debug + fmt::Display + Send + Sync {
    /// Correlation value for a scaled distance `r >= 0`
    fn value_at(&self, r: f64) -> f64;

    /// Length scale of the model
    fn length_scale(&self) -> f64;

    /// Correlation between two points
    fn value(&self, x: &ArrayView1<f64>, y: &ArrayView1<f64>) -> f64 {
        let d2 = Zip::from(x).and(y).fold(0., |acc, &a, &b| acc + (a - b) * (a - b));
        self.value_at(d2.sqrt() / self.length_scale())
    }

    /// Correlation matrix `R[i, j] = corr(x_i, y_j)` between rows of `x` and rows of `y`
    fn matrix(
        &self,
        x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        y: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Array2<f64> {
        let mut r = Array2::zeros((x.nrows(), y.nrows()));
        Zip::indexed(&mut r).for_each(|(i, j), v| *v = self.value(&x.row(i), &y.row(j)));
        r
    }
}

/// Squared exponential correlation model
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct SquaredExponentialCorr {
    pub length_scale: f64,
}

impl SquaredExponentialCorr {
    pub fn new(length_scale: f64) -> Self {
        SquaredExponentialCorr { length_scale }
    }
}

impl Default for SquaredExponentialCorr {
    fn default() -> Self {
        SquaredExponentialCorr::new(1.)
    }
}

impl CorrelationModel for SquaredExponentialCorr {
    fn value_at(&self, r: f64) -> f64 {
        (-0.5 * r * r).exp()
    }

    fn length_scale(&self) -> f64 {
        self.length_scale
    }
}

impl fmt::Display for SquaredExponentialCorr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SquaredExponential(l={})", self.length_scale)
    }
}

/// Matern 3/2 correlation model
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Matern32Corr {
    pub length_scale: f64,
}

impl Matern32Corr {
    pub fn new(length_scale: f64) -> Self {
        Matern32Corr { length_scale }
    }
}

impl Default for Matern32Corr {
    fn default() -> Self {
        Matern32Corr::new(1.)
    }
}

impl CorrelationModel for Matern32Corr {
    fn value_at(&self, r: f64) -> f64 {
        let a = SQRT_3 * r;
        (1. + a) * (-a).exp()
    }

    fn length_scale(&self) -> f64 {
        self.length_scale
    }
}

impl fmt::Display for Matern32Corr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Matern32(l={})", self.length_scale)
    }
}

/// Matern 5/2 correlation model
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Matern52Corr {
    pub length_scale: f64,
}

impl Matern52Corr {
    pub fn new(length_scale: f64) -> Self {
        Matern52Corr { length_scale }
    }
}

impl Default for Matern52Corr {
    fn default() -> Self {
        Matern52Corr::new(1.)
    }
}

impl CorrelationModel for Matern52Corr {
    fn value_at(&self, r: f64) -> f64 {
        let a = SQRT_5 * r;
        (1. + a + a * a / 3.) * (-a).exp()
    }

    fn length_scale(&self) -> f64 {
        self.length_scale
    }
}

impl fmt::Display for Matern52Corr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Matern52(l={})", self.length_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_unit_correlation_at_zero_distance() {
        let x = array![[0.3, 1.2]];
        assert_abs_diff_eq!(SquaredExponentialCorr::new(0.5).matrix(&x, &x)[[0, 0]], 1.);
        assert_abs_diff_eq!(Matern32Corr::new(0.5).matrix(&x, &x)[[0, 0]], 1.);
        assert_abs_diff_eq!(Matern52Corr::new(0.5).matrix(&x, &x)[[0, 0]], 1.);
    }

    #[test]
    fn test_matern52_values() {
        let corr = Matern52Corr::new(0.25);
        // r = 1 => (1 + sqrt(5) + 5/3) exp(-sqrt(5))
        let expected = (1. + SQRT_5 + 5. / 3.) * (-SQRT_5).exp();
        let x = array![[1.0], [1.25]];
        let r = corr.matrix(&x, &x);
        assert_abs_diff_eq!(r[[0, 1]], expected, epsilon = 1e-12);
        assert_abs_diff_eq!(r[[1, 0]], r[[0, 1]]);
    }

    #[test]
    fn test_correlation_decreases_with_distance() {
        let corr = Matern32Corr::new(1.);
        let mut prev = corr.value_at(0.);
        for i in 1..10 {
            let v = corr.value_at(i as f64 * 0.5);
            assert!(v < prev);
            assert!(v > 0.);
            prev = v;
        }
    }
}
