//! Error types for guide calibration.

use thiserror::Error;

/// Errors that can occur during circle fitting and motor solves.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GuideError {
    /// Too few sweep points for a fit.
    #[error("need at least {required} points, got {provided}")]
    InsufficientPoints {
        /// Minimum number of points.
        required: usize,
        /// Number of points supplied.
        provided: usize,
    },

    /// The point cloud is degenerate (collinear or coincident); no
    /// validated center/radius can be produced.
    #[error("numeric singularity in {context}")]
    NumericSingularity {
        /// The computation that collapsed.
        context: &'static str,
    },

    /// The motor circle and the target line do not intersect.
    #[error("target line misses the motor circle by {miss_mm} mm")]
    NoIntersection {
        /// Closest-approach shortfall, millimeters.
        miss_mm: f64,
    },
}

/// Result type for guide calibration operations.
pub type GuideResult<T> = Result<T, GuideError>;
