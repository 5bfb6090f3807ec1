use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Length mismatch: {x_len} abscissae vs {y_len} ordinates")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("Spline needs at least 2 knots, got {0}")]
    TooFewKnots(usize),

    #[error("Knots must be strictly increasing (index {index}: {prev} -> {next})")]
    NonIncreasingKnots { index: usize, prev: f64, next: f64 },

    #[error("Invalid smoothing sigma: {0}")]
    InvalidSigma(f64),

    #[error("Singular tridiagonal system at row {0}")]
    SingularSystem(usize),

    #[error("Invalid throttle profile: {0}")]
    InvalidProfile(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
