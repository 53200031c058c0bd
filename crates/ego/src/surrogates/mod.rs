//! Surrogate oracles of the objective and constraint functions.
//!
//! An oracle wraps a [`SurrogateBuilder`] configuration and the model trained
//! from the whole observation history. Each refit replaces the model, nothing is
//! updated incrementally.

use crate::errors::{EgoError, Result};

use log::{debug, info};
use ndarray::{ArrayView1, ArrayView2};
use safebo_gp::{correlation_models::Matern52Corr, GpParams, Surrogate, SurrogateBuilder};

/// Length scale of the Matern 5/2 correlation of the default surrogates
pub const DEFAULT_LENGTH_SCALE: f64 = 0.25;

/// Default objective surrogate configuration: Matern 5/2 kernel scaled by 0.5
/// plus a white noise of 0.15 as the objective is expected to be noisy.
pub fn default_objective_gp() -> GpParams<Matern52Corr> {
    GpParams::new(Matern52Corr::new(DEFAULT_LENGTH_SCALE))
        .output_scale(0.5)
        .noise_level(0.15)
}

/// Default constraint surrogate configuration: Matern 5/2 kernel scaled by sqrt(2)
/// with a constant prior mean of 1.5 (expected safe level) and a small white noise
/// of 1e-4 as constraint measurements are expected to be precise.
pub fn default_constraint_gp() -> GpParams<Matern52Corr> {
    GpParams::new(Matern52Corr::new(DEFAULT_LENGTH_SCALE))
        .prior_mean(1.5)
        .output_scale(std::f64::consts::SQRT_2)
        .noise_level(1e-4)
}

/// A named surrogate oracle, either unfitted or holding a model trained
/// on the whole history of observations.
#[derive(Debug)]
pub struct SurrogateOracle<SB: SurrogateBuilder> {
    name: String,
    builder: SB,
    model: Option<Box<dyn Surrogate>>,
}

impl<SB: SurrogateBuilder> SurrogateOracle<SB> {
    /// Create an unfitted oracle
    pub fn new(name: &str, builder: SB) -> Self {
        SurrogateOracle {
            name: name.to_string(),
            builder,
            model: None,
        }
    }

    /// Name of the oracle (used in logs and errors)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Surrogate configuration
    pub fn builder(&self) -> &SB {
        &self.builder
    }

    /// Whether a model was fitted
    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Fitted model if any
    pub fn model(&self) -> Option<&dyn Surrogate> {
        self.model.as_deref()
    }

    /// Train a model on `(xt, yt)` without modifying the oracle
    pub fn train(&self, xt: ArrayView2<f64>, yt: ArrayView1<f64>) -> Result<Box<dyn Surrogate>> {
        debug!("{} surrogate training on {} points...", self.name, xt.nrows());
        self.builder
            .train(xt, yt)
            .map_err(|source| EgoError::FitError {
                model: self.name.clone(),
                n_obs: xt.nrows(),
                source,
            })
    }

    /// Replace the current model by `model`
    pub fn install(&mut self, model: Box<dyn Surrogate>) {
        info!("{} surrogate fitted: {}", self.name, model);
        self.model = Some(model);
    }

    /// Refit from the given training data, replacing any previous model.
    /// The previous model is kept when training fails.
    pub fn refit(&mut self, xt: ArrayView2<f64>, yt: ArrayView1<f64>) -> Result<()> {
        let model = self.train(xt, yt)?;
        self.install(model);
        Ok(())
    }

    /// Posterior `(mean, std)` at `x`
    pub fn predict(&self, x: &ArrayView1<f64>) -> Result<(f64, f64)> {
        let model = self.model.as_deref().ok_or_else(|| EgoError::InvalidState {
            operation: "predict",
            n_obs: 0,
            reason: format!("{} surrogate is not fitted", self.name),
        })?;
        Ok(model.predict(x)?)
    }
}
