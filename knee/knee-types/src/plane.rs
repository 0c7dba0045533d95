//! Oriented plane used for resection and gap measurements.

use nalgebra::{Point3, Unit, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An oriented plane defined by a point and a unit normal.
///
/// The normal direction fixes the sign convention for
/// [`signed_distance`](Plane::signed_distance): positive on the side the
/// normal points toward.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    /// A point on the plane.
    pub point: Point3<f64>,
    /// Unit normal.
    pub normal: Unit<Vector3<f64>>,
}

impl Plane {
    /// Creates a plane from a point and a (not necessarily unit) normal.
    ///
    /// Returns `None` if the normal has near-zero length.
    #[must_use]
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let normal = Unit::try_new(normal, 1e-12)?;
        Some(Self { point, normal })
    }

    /// Creates a plane through three points.
    ///
    /// The normal follows the right-hand rule over `p0 -> p1 -> p2`.
    /// Returns `None` if the points are collinear or coincident.
    #[must_use]
    pub fn from_points(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>) -> Option<Self> {
        let normal = (p1 - p0).cross(&(p2 - p0));
        Self::new(p0, normal)
    }

    /// Signed distance from a point to the plane.
    ///
    /// Positive on the side the normal points toward.
    ///
    /// # Example
    ///
    /// ```
    /// use knee_types::Plane;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let plane = Plane::new(Point3::origin(), Vector3::z()).unwrap();
    /// assert!((plane.signed_distance(&Point3::new(0.0, 0.0, 2.0)) - 2.0).abs() < 1e-12);
    /// assert!((plane.signed_distance(&Point3::new(0.0, 0.0, -2.0)) + 2.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.point).dot(&self.normal)
    }

    /// Orthogonal projection of a point onto the plane.
    #[must_use]
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal.into_inner() * self.signed_distance(point)
    }
}
