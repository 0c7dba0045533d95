//! Implant size selection against a reconstructed bone surface.
//!
//! A size candidate is a fixed template of anterior/posterior check-point
//! pairs in the anatomical frame. [`select_implant`] scores every candidate
//! by signed distance to the bone surface and picks the feasible size with
//! the largest total clearance, falling back to the smallest size when
//! nothing fits.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod sdf;
mod select;
mod template;

pub use sdf::{closest_point_on_triangle, SignedSurface};
pub use select::{select_implant, Selection, FALLBACK_INDEX};
pub use template::{CheckPointPair, ImplantTemplate};
