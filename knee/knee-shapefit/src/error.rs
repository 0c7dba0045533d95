//! Error types for shape model fitting.

use knee_registration::RegistrationError;
use thiserror::Error;

/// Errors that can occur during shape model fitting.
#[derive(Debug, Error)]
pub enum ShapeFitError {
    /// The on-disk shape model artifact is missing or corrupt. Fatal for
    /// the fitting phase.
    #[error("shape model artifact invalid: {0}")]
    ModelArtifact(String),

    /// A target landmark has no correspondence in the model.
    #[error("no model correspondence for landmark '{name}'")]
    MissingLandmark {
        /// The unmatched landmark name.
        name: String,
    },

    /// Coefficient vector length does not match the model's mode count.
    #[error("expected {expected} coefficients, got {provided}")]
    CoefficientCount {
        /// Number of modes in the model.
        expected: usize,
        /// Number of coefficients supplied.
        provided: usize,
    },

    /// The external fitting process failed or produced no output mesh.
    #[error("fitting backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The external fitting process exceeded its deadline and was killed.
    #[error("fitting backend timed out after {timeout_secs} s")]
    BackendTimeout {
        /// The enforced deadline, seconds.
        timeout_secs: f64,
    },

    /// Rigid alignment of a candidate failed.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Result type for shape fitting operations.
pub type ShapeFitResult<T> = Result<T, ShapeFitError>;
