//! Mesh exchange and alignment telemetry records.
//!
//! Two concerns live here:
//!
//! - **PLY exchange** ([`load_ply`], [`save_ply`]): bone surfaces are handed
//!   to and received from the shape-fitting backend as PLY files with
//!   double-precision positions.
//! - **Telemetry records** ([`AlignmentRecord`]): throttled alignment
//!   samples are serialized as fixed-format delimited text lines for the
//!   secondary display.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod ply;
mod record;

pub use error::{IoError, IoResult};
pub use ply::{load_ply, save_ply};
pub use record::{AlignmentRecord, RECORD_TAG};
