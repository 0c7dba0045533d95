//! Digitized anatomical landmarks.
//!
//! A landmark is captured once by the operator with a tracked probe and is
//! immutable afterward. Re-capture replaces the landmark rather than
//! mutating it.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The tracked rigid body a landmark moves with.
///
/// Every digitized point is expressed relative to one of the tracked
/// reference arrays, so that it follows the bone (or tool) when the limb
/// moves.
///
/// # Example
///
/// ```
/// use knee_types::TrackedBody;
///
/// let femur = TrackedBody::Femur;
/// let guide = TrackedBody::tool("cutting_guide");
/// assert_eq!(guide.name(), "cutting_guide");
/// assert_eq!(femur.name(), "femur");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrackedBody {
    /// Femoral reference array.
    Femur,
    /// Tibial reference array.
    Tibia,
    /// Hand-held digitizing probe.
    Probe,
    /// Named instrument (e.g. `cutting_guide`).
    Tool(String),
}

impl TrackedBody {
    /// Creates a named instrument body.
    #[must_use]
    pub fn tool(name: impl Into<String>) -> Self {
        Self::Tool(name.into())
    }

    /// Returns the body name for display and telemetry.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Femur => "femur",
            Self::Tibia => "tibia",
            Self::Probe => "probe",
            Self::Tool(name) => name,
        }
    }
}

/// A named anatomical point digitized by the operator.
///
/// Positions are in millimeters in the owning body's local coordinates.
/// Confirmed landmarks are immutable; workflow reset discards them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Landmark {
    /// Anatomical name (e.g. `hip_center`, `medial_epicondyle`).
    pub name: String,
    /// Position in the owning body's local frame, millimeters.
    pub position: Point3<f64>,
    /// The tracked body this landmark moves with.
    pub body: TrackedBody,
}

impl Landmark {
    /// Creates a new landmark.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Point3<f64>, body: TrackedBody) -> Self {
        Self {
            name: name.into(),
            position,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_body_names() {
        assert_eq!(TrackedBody::Femur.name(), "femur");
        assert_eq!(TrackedBody::Tibia.name(), "tibia");
        assert_eq!(TrackedBody::Probe.name(), "probe");
        assert_eq!(TrackedBody::tool("stylus").name(), "stylus");
    }

    #[test]
    fn landmark_construction() {
        let lm = Landmark::new("knee_center", Point3::new(1.0, 2.0, 3.0), TrackedBody::Tibia);
        assert_eq!(lm.name, "knee_center");
        assert_eq!(lm.body, TrackedBody::Tibia);
        assert!((lm.position.z - 3.0).abs() < 1e-12);
    }
}
