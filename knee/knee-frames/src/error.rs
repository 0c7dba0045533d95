//! Error types for frame construction.

use thiserror::Error;

/// Errors that can occur while building an anatomical frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The landmark configuration is collinear or coincident and does not
    /// define a frame. The offending construction step is named so the
    /// operator knows which point to re-digitize.
    #[error("degenerate landmarks: {step} vector norm {norm:.3e} below epsilon")]
    DegenerateLandmarks {
        /// The construction step that collapsed (`primary-axis`,
        /// `lateral-medial`, or `cross-product`).
        step: &'static str,
        /// The offending vector norm.
        norm: f64,
    },
}

/// Result type for frame construction.
pub type FrameResult<T> = Result<T, FrameError>;
