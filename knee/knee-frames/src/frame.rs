//! Anatomical frame type and the landmark-based builder.

use knee_types::RigidTransform;
use nalgebra::{Matrix4, Point3, Rotation3, UnitQuaternion, Vector3};

use crate::error::{FrameError, FrameResult};

/// Norm threshold below which a landmark configuration is degenerate.
pub const DEGENERACY_EPSILON: f64 = 1e-9;

/// The operated limb side.
///
/// Fixes the sign of the lateral axis so that x always points laterally on
/// the operated limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left limb.
    Left,
    /// Right limb.
    Right,
}

/// An orthonormal, right-handed anatomical coordinate frame.
///
/// Invariants (enforced by [`build_frame`]): `x`, `y`, `z` are unit length,
/// mutually orthogonal, and `x x y = z` (determinant +1). The frame is
/// computed once per registration phase and read-only afterward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnatomicalFrame {
    /// Frame origin (the anatomical reference point `O`).
    pub origin: Point3<f64>,
    /// Lateral axis.
    pub x: Vector3<f64>,
    /// Anterior axis.
    pub y: Vector3<f64>,
    /// Primary (mechanical) axis.
    pub z: Vector3<f64>,
}

impl AnatomicalFrame {
    /// The mechanical axis direction of this frame.
    #[must_use]
    pub const fn mechanical_axis(&self) -> Vector3<f64> {
        self.z
    }

    /// Converts the frame to a 4x4 homogeneous matrix (columns = axes,
    /// translation = origin).
    #[must_use]
    pub fn to_matrix4(&self) -> Matrix4<f64> {
        let mut mat = Matrix4::identity();
        for i in 0..3 {
            mat[(i, 0)] = self.x[i];
            mat[(i, 1)] = self.y[i];
            mat[(i, 2)] = self.z[i];
            mat[(i, 3)] = self.origin[i];
        }
        mat
    }

    /// The rigid transform mapping frame-local coordinates to world.
    #[must_use]
    pub fn to_world(&self) -> RigidTransform {
        let rot = Rotation3::from_matrix_unchecked(nalgebra::Matrix3::from_columns(&[
            self.x, self.y, self.z,
        ]));
        RigidTransform::new(UnitQuaternion::from_rotation_matrix(&rot), self.origin.coords)
    }

    /// The rigid transform mapping world coordinates into this frame.
    #[must_use]
    pub fn from_world(&self) -> RigidTransform {
        self.to_world().inverse()
    }

    /// Expresses a world-space point in frame-local coordinates.
    #[must_use]
    pub fn localize(&self, point: &Point3<f64>) -> Point3<f64> {
        self.from_world().transform_point(point)
    }
}

/// Builds an anatomical frame from origin, axis-reference, lateral, and
/// medial landmarks.
///
/// `z = normalize(axis_ref - origin)`; `lateral` and `medial` are projected
/// onto the plane through `origin` perpendicular to z; x is the normalized
/// projected lateral-medial difference, sign resolved by `side`; `y = z x x`.
///
/// # Errors
///
/// Returns [`FrameError::DegenerateLandmarks`] when the primary axis, the
/// projected lateral-medial vector, or the closing cross product collapses
/// below [`DEGENERACY_EPSILON`] (collinear or coincident points). The caller
/// must have the operator re-digitize.
pub fn build_frame(
    origin: Point3<f64>,
    axis_ref: Point3<f64>,
    lateral: Point3<f64>,
    medial: Point3<f64>,
    side: Side,
) -> FrameResult<AnatomicalFrame> {
    let primary = axis_ref - origin;
    let primary_norm = primary.norm();
    if primary_norm < DEGENERACY_EPSILON {
        return Err(FrameError::DegenerateLandmarks {
            step: "primary-axis",
            norm: primary_norm,
        });
    }
    let z = primary / primary_norm;

    // Project the lateral/medial pair onto the plane through the origin
    // perpendicular to z.
    let project = |p: Point3<f64>| -> Vector3<f64> {
        let v = p - origin;
        v - z * v.dot(&z)
    };
    let lm = project(lateral) - project(medial);
    let lm_norm = lm.norm();
    if lm_norm < DEGENERACY_EPSILON {
        return Err(FrameError::DegenerateLandmarks {
            step: "lateral-medial",
            norm: lm_norm,
        });
    }

    let sign = match side {
        Side::Right => 1.0,
        Side::Left => -1.0,
    };
    let x = lm * (sign / lm_norm);

    let y = z.cross(&x);
    let y_norm = y.norm();
    if y_norm < DEGENERACY_EPSILON {
        return Err(FrameError::DegenerateLandmarks {
            step: "cross-product",
            norm: y_norm,
        });
    }
    let y = y / y_norm;

    // Re-orthogonalize x so the triad is exactly orthonormal even when the
    // projected lateral-medial direction carries numerical noise.
    let x = y.cross(&z);

    Ok(AnatomicalFrame {
        origin,
        x,
        y,
        z,
    })
}
