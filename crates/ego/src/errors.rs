use safebo_gp::GpError;
use thiserror::Error;

/// A result type for the safe EGO optimizer
pub type Result<T> = std::result::Result<T, EgoError>;

/// An error for the safe EGO optimizer
#[derive(Error, Debug)]
pub enum EgoError {
    /// When an operation requires fitted surrogates while no observation was recorded
    #[error("Invalid state in {operation} ({n_obs} observation(s)): {reason}")]
    InvalidState {
        operation: &'static str,
        n_obs: usize,
        reason: String,
    },
    /// When no recorded observation satisfies the safety constraint
    #[error("No feasible point among {n_obs} observation(s) (constraint threshold {v_min})")]
    NoFeasiblePoint { n_obs: usize, v_min: f64 },
    /// When a surrogate cannot be fitted on the observation history
    #[error("{model} surrogate fit failed with {n_obs} observation(s): {source}")]
    FitError {
        model: String,
        n_obs: usize,
        #[source]
        source: GpError,
    },
    /// When every multistart local optimization of the infill criterion failed
    #[error("Infill optimization exhausted: all {n_start} restarts failed ({n_obs} observation(s))")]
    OptimizerExhausted { n_start: usize, n_obs: usize },
    /// When the configuration is not valid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// When an observation given by the caller is rejected
    #[error("Invalid observation in add_observation ({n_obs} observation(s)): {reason}")]
    InvalidObservation { n_obs: usize, reason: String },
    /// When an error is raised by a surrogate outside training
    #[error(transparent)]
    GpError(#[from] GpError),
}
