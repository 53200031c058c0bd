use crate::correlation_models::{CorrelationModel, Matern52Corr};
use crate::errors::{GpError, Result};
use linfa::ParamGuard;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Default jitter added on the covariance diagonal for numerical stability
pub const DEFAULT_JITTER: f64 = 1e-5;

/// A set of validated GP parameters.
///
/// The covariance used by the GP is
/// `k(x, x') = output_scale * corr(x, x') + (noise_level + jitter) * delta(x, x')`
/// while `prior_mean` is the constant mean of the prior process.
/// None of these values is tuned during training.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct GpValidParams<Corr: CorrelationModel> {
    /// Constant prior mean
    pub(crate) prior_mean: f64,
    /// Output scale (signal variance) multiplying the correlation model
    pub(crate) output_scale: f64,
    /// White noise variance
    pub(crate) noise_level: f64,
    /// Jitter added to the diagonal of the training covariance
    pub(crate) jitter: f64,
    /// Correlation model
    pub(crate) corr: Corr,
}

impl Default for GpValidParams<Matern52Corr> {
    fn default() -> GpValidParams<Matern52Corr> {
        GpValidParams {
            prior_mean: 0.,
            output_scale: 1.,
            noise_level: 0.,
            jitter: DEFAULT_JITTER,
            corr: Matern52Corr::default(),
        }
    }
}

impl<Corr: CorrelationModel> GpValidParams<Corr> {
    /// Get constant prior mean
    pub fn prior_mean(&self) -> f64 {
        self.prior_mean
    }

    /// Get output scale
    pub fn output_scale(&self) -> f64 {
        self.output_scale
    }

    /// Get white noise variance
    pub fn noise_level(&self) -> f64 {
        self.noise_level
    }

    /// Get jitter
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Get correlation model
    pub fn corr(&self) -> &Corr {
        &self.corr
    }

    /// Prior variance at any point, noise included
    pub fn prior_variance(&self) -> f64 {
        self.output_scale + self.noise_level
    }

    /// Lowest variance a prediction can take
    pub fn variance_floor(&self) -> f64 {
        (self.noise_level + self.jitter).max(f64::EPSILON)
    }
}

/// The set of parameters of a Gaussian process, to be checked before training
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct GpParams<Corr: CorrelationModel>(pub(crate) GpValidParams<Corr>);

impl Default for GpParams<Matern52Corr> {
    fn default() -> Self {
        GpParams(GpValidParams::default())
    }
}

impl<Corr: CorrelationModel> GpParams<Corr> {
    /// A constructor for GP parameters given a correlation model
    pub fn new(corr: Corr) -> GpParams<Corr> {
        Self(GpValidParams {
            prior_mean: 0.,
            output_scale: 1.,
            noise_level: 0.,
            jitter: DEFAULT_JITTER,
            corr,
        })
    }

    /// Set constant prior mean
    pub fn prior_mean(mut self, prior_mean: f64) -> Self {
        self.0.prior_mean = prior_mean;
        self
    }

    /// Set output scale
    pub fn output_scale(mut self, output_scale: f64) -> Self {
        self.0.output_scale = output_scale;
        self
    }

    /// Set white noise variance
    pub fn noise_level(mut self, noise_level: f64) -> Self {
        self.0.noise_level = noise_level;
        self
    }

    /// Set jitter added to the training covariance diagonal
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.0.jitter = jitter;
        self
    }

    /// Set correlation model
    pub fn corr(mut self, corr: Corr) -> Self {
        self.0.corr = corr;
        self
    }
}

impl<Corr: CorrelationModel> ParamGuard for GpParams<Corr> {
    type Checked = GpValidParams<Corr>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let p = &self.0;
        let l = p.corr.length_scale();
        if !(l.is_finite() && l > 0.) {
            return Err(GpError::InvalidValueError(format!(
                "length scale should be positive, got {l}"
            )));
        }
        if !(p.output_scale.is_finite() && p.output_scale > 0.) {
            return Err(GpError::InvalidValueError(format!(
                "output scale should be positive, got {}",
                p.output_scale
            )));
        }
        if !(p.noise_level.is_finite() && p.noise_level >= 0.) {
            return Err(GpError::InvalidValueError(format!(
                "noise level should be non negative, got {}",
                p.noise_level
            )));
        }
        if !(p.jitter.is_finite() && p.jitter >= 0.) {
            return Err(GpError::InvalidValueError(format!(
                "jitter should be non negative, got {}",
                p.jitter
            )));
        }
        if !p.prior_mean.is_finite() {
            return Err(GpError::InvalidValueError(format!(
                "prior mean should be finite, got {}",
                p.prior_mean
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
