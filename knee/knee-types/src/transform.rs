//! Rigid transformation type shared across the navigation core.

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A proper rigid transformation: rotation followed by translation.
///
/// Unlike a general similarity transform there is no scale component. The
/// optical tracker reports metric coordinates, so only proper rigid motions
/// (determinant +1 rotations) are ever valid in this pipeline.
///
/// # Example
///
/// ```
/// use knee_types::RigidTransform;
/// use nalgebra::{Point3, UnitQuaternion, Vector3};
/// use std::f64::consts::PI;
///
/// let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
/// let transform = RigidTransform::new(rotation, Vector3::new(1.0, 2.0, 3.0));
///
/// let p = transform.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((p.x - 1.0).abs() < 1e-12);
/// assert!((p.y - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidTransform {
    /// Rotation as a unit quaternion.
    pub rotation: UnitQuaternion<f64>,
    /// Translation vector in millimeters.
    pub translation: Vector3<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// Creates a new rigid transform from rotation and translation.
    #[must_use]
    pub const fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Creates the identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Creates a transform with only translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation,
        }
    }

    /// Creates a transform with only rotation.
    #[must_use]
    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            rotation,
            translation: Vector3::zeros(),
        }
    }

    /// Transforms a 3D point (rotate, then translate).
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    /// Transforms a direction vector (rotation only).
    #[must_use]
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }

    /// Composes this transform with another (`self * other`).
    ///
    /// The result applies `other` first, then `self`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.translation + self.rotation * other.translation,
        }
    }

    /// Computes the inverse of this transform.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        Self {
            rotation: inv_rotation,
            translation: inv_rotation * (-self.translation),
        }
    }

    /// Converts to a 4x4 homogeneous transformation matrix.
    #[must_use]
    pub fn to_matrix4(&self) -> Matrix4<f64> {
        let mut mat = Matrix4::identity();
        let rot = self.rotation.to_rotation_matrix();
        for i in 0..3 {
            for j in 0..3 {
                mat[(i, j)] = rot[(i, j)];
            }
        }
        mat[(0, 3)] = self.translation.x;
        mat[(1, 3)] = self.translation.y;
        mat[(2, 3)] = self.translation.z;
        mat
    }

    /// Returns true if this transform is approximately the identity.
    #[must_use]
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.rotation.angle().abs() < epsilon && self.translation.norm() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn identity_leaves_points_fixed() {
        let transform = RigidTransform::identity();
        let point = Point3::new(1.0, 2.0, 3.0);
        let result = transform.transform_point(&point);
        assert_relative_eq!(result.coords, point.coords, epsilon = 1e-12);
    }

    #[test]
    fn rotation_90_degrees_z() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
        let transform = RigidTransform::from_rotation(rotation);
        let result = transform.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn compose_applies_right_to_left() {
        let rotate = RigidTransform::from_rotation(UnitQuaternion::from_axis_angle(
            &Vector3::z_axis(),
            PI / 2.0,
        ));
        let translate = RigidTransform::from_translation(Vector3::new(1.0, 0.0, 0.0));

        // Rotate first, then translate.
        let composed = translate.compose(&rotate);
        let result = composed.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(result.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn inverse_round_trips() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI / 3.0);
        let transform = RigidTransform::new(rotation, Vector3::new(10.0, -4.0, 2.5));

        let point = Point3::new(3.0, 1.0, -7.0);
        let recovered = transform
            .inverse()
            .transform_point(&transform.transform_point(&point));
        assert_relative_eq!(recovered.coords, point.coords, epsilon = 1e-10);
    }

    #[test]
    fn matrix4_carries_rotation_and_translation() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI / 4.0);
        let transform = RigidTransform::new(rotation, Vector3::new(1.0, 2.0, 3.0));
        let mat = transform.to_matrix4();

        assert_relative_eq!(mat[(0, 3)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(mat[(1, 3)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(mat[(2, 3)], 3.0, epsilon = 1e-12);
        assert_relative_eq!(mat[(3, 3)], 1.0, epsilon = 1e-12);

        // Rotation block must be proper orthonormal.
        let rot = mat.fixed_view::<3, 3>(0, 0);
        assert_relative_eq!(rot.determinant(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn transform_vector_ignores_translation() {
        let transform = RigidTransform::from_translation(Vector3::new(100.0, 100.0, 100.0));
        let v = transform.transform_vector(&Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(v, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn is_identity_tolerance() {
        assert!(RigidTransform::identity().is_identity(1e-10));
        let nudged = RigidTransform::from_translation(Vector3::new(0.001, 0.0, 0.0));
        assert!(!nudged.is_identity(1e-10));
        assert!(nudged.is_identity(0.01));
    }
}
