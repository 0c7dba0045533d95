//! Statistical shape model fitting for patient-specific bone surfaces.
//!
//! From 8 to 11 digitized landmarks this crate reconstructs a dense bone
//! mesh in three steps:
//!
//! 1. [`search_grid`] enumerates a discrete coefficient grid over the
//!    model's variation modes and keeps the candidate whose landmarks
//!    rigidly align best to the measured targets.
//! 2. [`pull_to_landmarks`] locally deforms the winning dense mesh so each
//!    bound vertex lands exactly on its target.
//! 3. An optional [`ShapeModelBackend`] refinement re-fits the deformed
//!    mesh against the full landmark cloud, either in-process
//!    ([`LinearShapeModel`]) or through an external executable
//!    ([`SubprocessBackend`]) bounded by a hard deadline.
//!
//! [`fit_shape`] runs the whole pipeline.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod backend;
mod deform;
mod error;
mod fitter;
mod model;
mod search;

pub use backend::{FitRequest, ShapeModelBackend, SubprocessBackend};
pub use deform::{pull_to_landmarks, DeformOutput, PULL_RADIUS_MM};
pub use error::{ShapeFitError, ShapeFitResult};
pub use fitter::{fit_shape, FitOutput, ShapeFitParams};
pub use model::{LinearShapeModel, ShapeModelArtifact};
pub use search::{
    search_grid, SearchParams, ShapeCandidate, COEFFICIENT_LIMIT, DEFAULT_STEPS,
};
