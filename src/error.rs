use thiserror::Error;

/// Result type alias for identity metric computations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can occur while scoring a sequence.
///
/// An empty ground truth or tracker sequence is not an error; those inputs
/// take the short-circuit path in [`identity_score`](crate::identity_score)
/// and always succeed.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// The similarity matrix at one timestep does not line up with the active identity arrays.
    #[error("similarity matrix at timestep {timestep} has shape {actual:?}, expected {expected:?}")]
    Shape {
        timestep: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Input values that can never produce meaningful metrics.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Numerical failure inside the assignment solver. When scoring a batch of
    /// sequences this should fail the affected sequence only.
    #[error("assignment failed: {0}")]
    Numeric(String),
}
