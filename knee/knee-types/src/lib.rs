//! Core data model for the knee navigation geometry pipeline.
//!
//! This crate defines the types shared by every stage of the navigation
//! core:
//!
//! - [`Landmark`] - A digitized anatomical point and the tracked body it
//!   moves with
//! - [`RigidTransform`] - A proper rigid motion (rotation + translation)
//! - [`BoneMesh`] - A dense bone surface with a named-vertex
//!   correspondence table
//! - [`Plane`] - An oriented plane for resection and gap measurements
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero GUI or scene-graph dependencies. It
//! can be used in calibration tools, offline analysis, and the intraoperative
//! navigation loop alike.
//!
//! # Example
//!
//! ```
//! use knee_types::{BoneMesh, Landmark, RigidTransform, TrackedBody};
//! use nalgebra::{Point3, Vector3};
//!
//! let hip = Landmark::new("hip_center", Point3::new(0.0, 0.0, 400.0), TrackedBody::Femur);
//! assert_eq!(hip.body, TrackedBody::Femur);
//!
//! let shift = RigidTransform::from_translation(Vector3::new(5.0, 0.0, 0.0));
//! let moved = shift.transform_point(&hip.position);
//! assert!((moved.x - 5.0).abs() < 1e-12);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod landmark;
mod mesh;
mod plane;
mod transform;

pub use landmark::{Landmark, TrackedBody};
pub use mesh::{BoneMesh, NamedVertex};
pub use plane::Plane;
pub use transform::RigidTransform;

// Re-export the nalgebra types that appear in public signatures.
pub use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
