//! Geometry and numerics core for computer-navigated total knee
//! arthroplasty.
//!
//! This umbrella crate re-exports the knee-* family. The crates are pure
//! geometry/numerics with no GUI or engine dependencies; the surgical
//! workflow shell, tracking hardware, and display sit on top.
//!
//! # Pipeline
//!
//! 1. Digitized landmarks are registered rigidly ([`registration`]) and
//!    turned into anatomical frames ([`frames`]).
//! 2. A statistical shape model is fitted to the landmarks to produce the
//!    patient-specific bone mesh ([`shapefit`]).
//! 3. The implant size is selected against that mesh ([`implant`]).
//! 4. During navigation, tracked poses stream through the alignment
//!    engine ([`align`]) producing angle/gap samples for display and
//!    telemetry ([`io`]).
//! 5. Cutting-guide motors are calibrated and driven via [`guide`].
//!
//! # Module organization
//!
//! - [`types`] - shared data model: `Landmark`, `BoneMesh`,
//!   `RigidTransform`, `Plane`
//! - [`frames`] - anatomical frame construction from landmarks
//! - [`registration`] - Kabsch rigid solve and ICP refinement
//! - [`shapefit`] - shape model, grid search, deformation, backends
//! - [`implant`] - implant templates and size selection
//! - [`align`] - transform arena, alignment engine, phase hand-off
//! - [`guide`] - circle fitting and two-motor inverse kinematics
//! - [`io`] - PLY exchange and telemetry records

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

/// Shared data model.
pub use knee_types as types;

/// Anatomical frame construction from landmarks.
pub use knee_frames as frames;

/// Kabsch rigid solve and ICP refinement.
pub use knee_registration as registration;

/// Shape model fitting: grid search, deformation, backends.
pub use knee_shapefit as shapefit;

/// Implant templates and size selection.
pub use knee_implant as implant;

/// Transform arena, alignment engine, phase hand-off.
pub use knee_align as align;

/// Circle fitting and two-motor inverse kinematics.
pub use knee_guide as guide;

/// PLY exchange and telemetry records.
pub use knee_io as io;

/// Common imports for the navigation pipeline.
pub mod prelude {
    pub use knee_align::{
        AlignmentEngine, AlignmentSample, BodyHandles, CondylarPoints, EngineConfig,
        RegistrationPhase, SampleBus, TransformArena,
    };
    pub use knee_frames::{build_frame, AnatomicalFrame, Side};
    pub use knee_guide::{fit_circle, solve_motor_target, TieBreak};
    pub use knee_implant::{select_implant, ImplantTemplate};
    pub use knee_registration::{refine_icp, rigid_from_landmarks, IcpParams};
    pub use knee_shapefit::{fit_shape, LinearShapeModel, ShapeFitParams};
    pub use knee_types::{BoneMesh, Landmark, Plane, RigidTransform, TrackedBody};
}
