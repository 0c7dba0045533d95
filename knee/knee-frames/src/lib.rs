//! Anatomical coordinate frame construction.
//!
//! Builds an orthonormal, right-handed anatomical frame from three or four
//! digitized landmarks:
//!
//! - an **origin** point `O` (e.g. the knee center),
//! - an **axis reference** `A` defining the primary axis direction `O -> A`
//!   (e.g. the hip center for the femoral mechanical axis),
//! - **lateral** and **medial** reference points `L`, `M` fixing the
//!   frontal plane.
//!
//! The z axis is the normalized primary direction; `L` and `M` are
//! projected onto the plane through `O` perpendicular to z, and their
//! difference (sign resolved by the operated [`Side`]) becomes x; y closes
//! the right-handed triad.
//!
//! # Example
//!
//! ```
//! use knee_frames::{build_frame, Side};
//! use nalgebra::Point3;
//!
//! let frame = build_frame(
//!     Point3::new(0.0, 0.0, 0.0),   // origin
//!     Point3::new(0.0, 0.0, 10.0),  // axis reference
//!     Point3::new(10.0, 0.0, 0.0),  // lateral
//!     Point3::new(-10.0, 0.0, 0.0), // medial
//!     Side::Right,
//! )
//! .unwrap();
//!
//! assert!((frame.z.z - 1.0).abs() < 1e-9);
//! assert!((frame.x.x - 1.0).abs() < 1e-9);
//! assert!((frame.y.y - 1.0).abs() < 1e-9);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod frame;

pub use error::{FrameError, FrameResult};
pub use frame::{build_frame, AnatomicalFrame, Side, DEGENERACY_EPSILON};
