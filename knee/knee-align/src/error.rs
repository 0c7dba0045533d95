//! Error types for the alignment engine.

use thiserror::Error;

use crate::arena::TransformId;

/// Errors that can occur while composing poses or transitioning phases.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// A transform chain references an id the arena does not hold.
    #[error("unknown transform id {0:?}")]
    UnknownTransform(TransformId),

    /// The registration phase tried to publish before all state was set.
    #[error("registration incomplete: missing {missing}")]
    IncompleteRegistration {
        /// The state that was never provided.
        missing: &'static str,
    },
}

/// Result type for alignment operations.
pub type AlignResult<T> = Result<T, AlignError>;
