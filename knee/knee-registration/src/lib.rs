//! Rigid registration for the knee navigation pipeline.
//!
//! Two operations are provided:
//!
//! - [`rigid_from_landmarks`] - Closed-form least-squares rigid transform
//!   between paired point sets (Kabsch algorithm), reflection-corrected so
//!   the result is always a proper rotation.
//! - [`refine_icp`] - Rigid-only iterative closest point refinement of a
//!   moving point cloud against a bone surface, KD-tree accelerated.
//!
//! # Example
//!
//! ```
//! use knee_registration::rigid_from_landmarks;
//! use nalgebra::Point3;
//!
//! let source = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let target: Vec<_> = source
//!     .iter()
//!     .map(|p| Point3::new(p.x + 1.0, p.y + 2.0, p.z + 3.0))
//!     .collect();
//!
//! let transform = rigid_from_landmarks(&source, &target).unwrap();
//! let aligned = transform.transform_point(&source[0]);
//! assert!((aligned.coords - target[0].coords).norm() < 1e-9);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod icp;
mod kabsch;

pub use error::{RegistrationError, RegistrationResult};
pub use icp::{refine_icp, IcpParams, IcpResult};
pub use kabsch::rigid_from_landmarks;
