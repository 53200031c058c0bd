//! Surrogate traits
//!
//! This module defines the `Surrogate` trait, the fit/predict seam consumed by the
//! optimizer, and the `SurrogateBuilder` trait used to configure and train surrogates
//! from the whole training history.

use crate::algorithm::GaussianProcess;
use crate::correlation_models::CorrelationModel;
use crate::errors::Result;
use crate::parameters::GpParams;

use linfa::ParamGuard;
use ndarray::{ArrayView1, ArrayView2};
use std::fmt;

/// A trained surrogate model able to give a posterior mean and standard deviation
/// anywhere in the input space.
pub trait Surrogate: Send + Sync + fmt::Debug + fmt::Display {
    /// Posterior `(mean, standard deviation)` at the point `x`.
    /// The returned standard deviation is always strictly positive.
    fn predict(&self, x: &ArrayView1<f64>) -> Result<(f64, f64)>;

    /// Number of training points
    fn n_samples(&self) -> usize;

    /// Input dimension
    fn dim(&self) -> usize;
}

/// A trait for surrogate builder (aka surrogate configuration and training).
pub trait SurrogateBuilder: Clone + Send + Sync {
    /// Train the surrogate with given training dataset (x, y).
    /// Training always starts from scratch, no state is kept between trainings.
    fn train(&self, xt: ArrayView2<f64>, yt: ArrayView1<f64>) -> Result<Box<dyn Surrogate>>;
}

impl<Corr: CorrelationModel + 'static> Surrogate for GaussianProcess<Corr> {
    fn predict(&self, x: &ArrayView1<f64>) -> Result<(f64, f64)> {
        self.predict_at(x)
    }

    fn n_samples(&self) -> usize {
        GaussianProcess::n_samples(self)
    }

    fn dim(&self) -> usize {
        GaussianProcess::dim(self)
    }
}

impl<Corr: CorrelationModel + 'static> SurrogateBuilder for GpParams<Corr> {
    fn train(&self, xt: ArrayView2<f64>, yt: ArrayView1<f64>) -> Result<Box<dyn Surrogate>> {
        let checked = self.check_ref()?;
        let gp = checked.train(&xt, &yt)?;
        Ok(Box::new(gp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation_models::Matern52Corr;
    use ndarray::{array, Array};

    #[test]
    fn test_builder_train_and_predict() {
        let builder = GpParams::new(Matern52Corr::new(0.25))
            .output_scale(0.5)
            .noise_level(0.15);
        let xt = array![[0.5], [2.0], [3.5]];
        let yt = array![-2.0, -0.5, -1.0];
        let model = builder.train(xt.view(), yt.view()).unwrap();
        assert_eq!(model.n_samples(), 3);
        assert_eq!(model.dim(), 1);
        for x in Array::linspace(0., 5., 51).iter() {
            let (_, std) = model.predict(&array![*x].view()).unwrap();
            assert!(std > 0.);
        }
    }

    #[test]
    fn test_builder_rejects_invalid_params() {
        let builder = GpParams::new(Matern52Corr::new(-1.));
        let res = builder.train(array![[0.5]].view(), array![1.].view());
        assert!(res.is_err());
    }
}
