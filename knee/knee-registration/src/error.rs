//! Error types for rigid registration.

use thiserror::Error;

/// Errors that can occur during rigid registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Fewer paired points than the closed-form solve requires.
    #[error("at least {required} paired points required, got {provided}")]
    InsufficientPoints {
        /// Minimum number of correspondences.
        required: usize,
        /// Number of correspondences provided.
        provided: usize,
    },

    /// The point configuration is collinear or coincident: no unique
    /// rotation exists and the operator must re-digitize.
    #[error("degenerate landmark configuration: no unique rotation")]
    DegenerateLandmarks,

    /// SVD of the cross-covariance matrix produced no factors.
    #[error("SVD computation failed during transform estimation")]
    SvdFailed,

    /// ICP found no valid correspondences within the distance gate.
    #[error("no valid correspondences between moving cloud and surface")]
    NoCorrespondences,

    /// The target surface has no vertices.
    #[error("target surface has no vertices")]
    EmptySurface,
}

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;
