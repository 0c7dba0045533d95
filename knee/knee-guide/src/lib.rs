//! Cutting-guide calibration.
//!
//! The guide carries two motors; motor 2 rides a fixed-radius arc around
//! motor 1. Calibration sweeps the guide and fits the arc with
//! [`fit_circle`]; cut planning intersects the arc with the desired
//! resection direction via [`solve_motor_target`] and reports motor travel
//! through [`signed_rotation_angle`].

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod circle;
mod error;
mod motor;

pub use circle::{fit_circle, CircleFit};
pub use error::{GuideError, GuideResult};
pub use motor::{signed_rotation_angle, solve_motor_target, TieBreak};
