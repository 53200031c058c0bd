use thiserror::Error;

/// A result type for GP regression algorithm
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when modeling a GP
#[derive(Error, Debug)]
pub enum GpError {
    /// When linear algebra computation fails (typically a non positive definite
    /// covariance matrix on degenerate training data)
    #[error("Linear Algebra error: {0}")]
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When training data or query points do not have the expected shape
    #[error("Invalid shape: {0}")]
    InvalidShapeError(String),
    /// When a parameter or a data value is not valid
    #[error("Invalid value: {0}")]
    InvalidValueError(String),
}
