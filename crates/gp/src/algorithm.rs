use crate::correlation_models::CorrelationModel;
use crate::errors::{GpError, Result};
use crate::parameters::{GpParams, GpValidParams};

use linfa_linalg::cholesky::Cholesky;
use linfa_linalg::triangular::{SolveTriangular, UPLO};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structure for trained Gaussian process regression with fixed hyperparameters.
///
/// Given training data `(X, y)`, the posterior at `x` reads:
///
/// `mean(x) = m + k(x, X) K^-1 (y - m)`
///
/// `var(x) = s + noise - k(x, X) K^-1 k(X, x)`
///
/// with `K = s R(X, X) + (noise + jitter) I` factorized once with a Cholesky
/// decomposition at training time. The prediction variance keeps the white noise
/// term hence it never falls below the noise level of the model.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct GaussianProcess<Corr: CorrelationModel> {
    /// Parameters used to train the model
    params: GpValidParams<Corr>,
    /// Training inputs
    xt: Array2<f64>,
    /// Lower triangular Cholesky factor of the training covariance
    chol: Array2<f64>,
    /// Weights `K^-1 (y - m)`
    alpha: Array1<f64>,
}

impl<Corr: CorrelationModel> GaussianProcess<Corr> {
    /// Gp parameters constructor
    pub fn params(corr: Corr) -> GpParams<Corr> {
        GpParams::new(corr)
    }

    /// Parameters the model was trained with
    pub fn parameters(&self) -> &GpValidParams<Corr> {
        &self.params
    }

    /// Number of training samples
    pub fn n_samples(&self) -> usize {
        self.xt.nrows()
    }

    /// Input dimension
    pub fn dim(&self) -> usize {
        self.xt.ncols()
    }

    fn check_query(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<()> {
        if x.ncols() != self.dim() {
            return Err(GpError::InvalidShapeError(format!(
                "expected points of dimension {}, got {}",
                self.dim(),
                x.ncols()
            )));
        }
        Ok(())
    }

    /// Cross covariance `s R(X, x)` as a (n_samples, n_query) matrix
    fn cross_covariance(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array2<f64> {
        self.params.corr.matrix(&self.xt, x) * self.params.output_scale
    }

    /// Predict posterior means at `n` points given as a (n, nx) matrix
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Array1<f64>> {
        self.check_query(x)?;
        let k = self.cross_covariance(x);
        Ok(k.t().dot(&self.alpha) + self.params.prior_mean)
    }

    /// Predict posterior variances at `n` points given as a (n, nx) matrix
    pub fn predict_var(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Array1<f64>> {
        self.check_query(x)?;
        let k = self.cross_covariance(x);
        let v = self.chol.solve_triangular(&k, UPLO::Lower)?;
        let reduction = v.mapv(|e| e * e).sum_axis(Axis(0));
        let prior = self.params.prior_variance();
        let floor = self.params.variance_floor();
        Ok(reduction.mapv(|r| (prior - r).max(floor)))
    }

    /// Predict posterior mean and standard deviation at a single point
    pub fn predict_at(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> Result<(f64, f64)> {
        let x = x.view().insert_axis(Axis(0));
        let mean = self.predict(&x)?;
        let var = self.predict_var(&x)?;
        Ok((mean[0], var[0].sqrt()))
    }
}

impl<Corr: CorrelationModel> fmt::Display for GaussianProcess<Corr> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GP(mean={}, scale={}, noise={}, corr={}, n={})",
            self.params.prior_mean,
            self.params.output_scale,
            self.params.noise_level,
            self.params.corr,
            self.n_samples()
        )
    }
}

impl<Corr: CorrelationModel> GpValidParams<Corr> {
    /// Train a Gaussian process on `(xt, yt)` where `xt` is a (n, nx) matrix and
    /// `yt` the n corresponding output values.
    pub fn train(
        &self,
        xt: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        yt: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    ) -> Result<GaussianProcess<Corr>> {
        if xt.nrows() == 0 || xt.ncols() == 0 {
            return Err(GpError::InvalidShapeError(format!(
                "training inputs should be non empty, got shape {:?}",
                xt.shape()
            )));
        }
        if xt.nrows() != yt.len() {
            return Err(GpError::InvalidShapeError(format!(
                "training inputs and outputs sizes mismatch ({} != {})",
                xt.nrows(),
                yt.len()
            )));
        }
        if !xt.iter().chain(yt.iter()).all(|v| v.is_finite()) {
            return Err(GpError::InvalidValueError(
                "training data should contain finite values only".to_string(),
            ));
        }

        let n = xt.nrows();
        let mut k = self.corr.matrix(xt, xt) * self.output_scale;
        let diag = self.noise_level + self.jitter;
        k.diag_mut().mapv_inplace(|v| v + diag);
        let chol = k.cholesky()?;

        let centered = yt.mapv(|y| y - self.prior_mean).insert_axis(Axis(1));
        let w = chol.solve_triangular(&centered, UPLO::Lower)?;
        let alpha = chol.t().solve_triangular(&w, UPLO::Upper)?;
        let alpha = alpha.column(0).to_owned();
        log::debug!("GP trained on {} points", n);

        Ok(GaussianProcess {
            params: self.clone(),
            xt: xt.to_owned(),
            chol,
            alpha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation_models::{Matern52Corr, SquaredExponentialCorr};
    use approx::assert_abs_diff_eq;
    use linfa::ParamGuard;
    use ndarray::{array, Array, ArrayView1, Zip};

    /// Posterior means at training points
    fn fitted_values<Corr: CorrelationModel>(gp: &GaussianProcess<Corr>) -> Array1<f64> {
        let mut out = Array1::zeros(gp.n_samples());
        Zip::from(&mut out)
            .and(gp.xt.rows())
            .for_each(|o, x: ArrayView1<f64>| *o = gp.predict_at(&x).unwrap().0);
        out
    }

    fn xsinx(x: &Array2<f64>) -> Array1<f64> {
        x.column(0).mapv(|v| (v - 3.5) * ((v - 3.5) / std::f64::consts::PI).sin())
    }

    #[test]
    fn test_interpolation_without_noise() {
        let xt = array![[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]];
        let yt = xsinx(&xt);
        let gp = GaussianProcess::params(SquaredExponentialCorr::new(3.))
            .output_scale(10.)
            .jitter(1e-10)
            .check()
            .unwrap()
            .train(&xt, &yt)
            .unwrap();
        for (fitted, expected) in fitted_values(&gp).iter().zip(yt.iter()) {
            assert_abs_diff_eq!(*fitted, *expected, epsilon = 1e-4);
        }
        let var = gp.predict_var(&xt).unwrap();
        assert!(var.iter().all(|&v| v > 0. && v < 1e-4));
    }

    #[test]
    fn test_prior_recovered_far_from_data() {
        let xt = array![[0.1], [0.4]];
        let yt = array![2.0, 1.0];
        let gp = GaussianProcess::params(Matern52Corr::new(0.25))
            .prior_mean(1.5)
            .output_scale(2f64.sqrt())
            .noise_level(1e-4)
            .check()
            .unwrap()
            .train(&xt, &yt)
            .unwrap();
        let (mean, std) = gp.predict_at(&array![4.5]).unwrap();
        assert_abs_diff_eq!(mean, 1.5, epsilon = 1e-8);
        assert_abs_diff_eq!(std, (2f64.sqrt() + 1e-4).sqrt(), epsilon = 1e-8);
    }

    #[test]
    fn test_std_never_below_noise() {
        let xt = Array::linspace(0f64, 5., 30).insert_axis(Axis(1));
        let yt = xt.column(0).mapv(|v: f64| -(v - 2.5).abs());
        let params = GaussianProcess::params(Matern52Corr::new(0.25))
            .output_scale(0.5)
            .noise_level(0.15)
            .check()
            .unwrap();
        let gp = params.train(&xt, &yt).unwrap();
        let xtest = Array::linspace(0., 5., 101).insert_axis(Axis(1));
        let var = gp.predict_var(&xtest).unwrap();
        assert!(var.iter().all(|&v| v >= params.variance_floor()));
        // noise is part of the predictive variance
        assert!(var.iter().all(|&v| v >= 0.15));
    }

    #[test]
    fn test_invalid_training_data() {
        let params = GaussianProcess::params(Matern52Corr::new(0.25))
            .check()
            .unwrap();
        let empty = Array2::<f64>::zeros((0, 1));
        assert!(matches!(
            params.train(&empty, &Array1::zeros(0)),
            Err(GpError::InvalidShapeError(_))
        ));
        assert!(matches!(
            params.train(&array![[1.], [2.]], &array![1.]),
            Err(GpError::InvalidShapeError(_))
        ));
        assert!(matches!(
            params.train(&array![[1.], [2.]], &array![1., f64::NAN]),
            Err(GpError::InvalidValueError(_))
        ));
    }

    #[test]
    fn test_degenerate_covariance_is_linalg_error() {
        let params = GaussianProcess::params(Matern52Corr::new(0.25))
            .jitter(0.)
            .check()
            .unwrap();
        assert!(matches!(
            params.train(&array![[1.], [1.]], &array![1., 2.]),
            Err(GpError::LinalgError(_))
        ));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let gp = GaussianProcess::params(Matern52Corr::new(0.25))
            .check()
            .unwrap()
            .train(&array![[1.], [2.]], &array![1., 2.])
            .unwrap();
        assert!(gp.predict(&array![[1., 2.]]).is_err());
        assert_eq!(gp.n_samples(), 2);
        assert_eq!(gp.dim(), 1);
    }

    #[test]
    fn test_retraining_replaces_state() {
        let params = GaussianProcess::params(Matern52Corr::new(0.25))
            .noise_level(1e-6)
            .check()
            .unwrap();
        let gp1 = params.train(&array![[1.]], &array![3.]).unwrap();
        let gp2 = params
            .train(&array![[1.], [2.]], &array![3., -3.])
            .unwrap();
        let x = array![2.];
        assert!(gp1.predict_at(&x).unwrap().0 > 0.);
        assert_abs_diff_eq!(gp2.predict_at(&x).unwrap().0, -3., epsilon = 1e-3);
    }
}
