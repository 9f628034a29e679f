//! Error types for the optimization layer.

use thiserror::Error;

/// Errors that can occur during an optimization run.
///
/// Configuration errors (`MissingBounds`, `MissingInitialGuess`,
/// `InvalidOptions`) are raised before any objective evaluation.
/// `Solver` errors surface an internal solver failure verbatim; no
/// algorithm retries a failed solve.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OptimizeError {
    /// The algorithm requires per-parameter bounds and none were supplied.
    #[error("The chosen algorithm requires bounds on the function arguments")]
    MissingBounds,

    /// The algorithm requires an initial guess and none was supplied.
    #[error("The chosen algorithm requires an initial guess")]
    MissingInitialGuess,

    /// A configuration value is outside its valid range.
    #[error("Invalid option '{option}': {reason}")]
    InvalidOptions {
        /// Name of the offending option.
        option: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The solver failed internally (e.g. a singular surrogate system).
    #[error("Solver failure: {0}")]
    Solver(String),
}

/// Result type for optimization operations.
pub type OptResult<T> = Result<T, OptimizeError>;
