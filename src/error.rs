//! Error types for the simulation engine.

use thiserror::Error;

/// Errors surfaced by the simulation engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimulationError {
    /// A request or parameter failed validation before the simulation loop
    /// started.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Human-readable description of what failed validation.
        reason: String,
    },

    /// The covariance matrix was not positive semidefinite even after the
    /// jitter retry.
    #[error(
        "covariance matrix is not positive semidefinite (smallest eigenvalue {smallest_eigenvalue})"
    )]
    NumericalFailure {
        /// Smallest eigenvalue of the offending covariance matrix, for
        /// diagnosis.
        smallest_eigenvalue: f64,
    },

    /// A model or scenario identifier did not match a known variant.
    #[error("unknown enum value: {value}")]
    UnknownEnum {
        /// The unrecognised value.
        value: String,
    },
}

/// Result type for simulation engine operations.
pub type Result<T> = std::result::Result<T, SimulationError>;

impl SimulationError {
    /// Build an [`SimulationError::InvalidParameter`] from a message.
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}
