//! Error taxonomy shared by the model types.

use thiserror::Error;

/// Failures raised by the perceptual map model.
///
/// None of these are transient: every variant signals a configuration or
/// programming mistake that the caller has to fix before retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Setup data is inconsistent (e.g. criteria importances not summing to one).
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A call was made with a malformed or missing argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A year index fell outside the simulated horizon.
    #[error("year {year} out of range for a {len}-year series")]
    OutOfRange {
        /// Requested year.
        year: usize,
        /// Number of years held by the series.
        len: usize,
    },
    /// No entity is registered under the given name.
    #[error("no entity named '{0}'")]
    NotFound(String),
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;
