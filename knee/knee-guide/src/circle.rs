//! Least-squares circle fitting for swept marker trajectories.
//!
//! The motor arc sweep produces points on a circle in an unknown plane.
//! The fit runs in two stages: the plane is the least-squares plane of the
//! cloud (smallest-variance eigenvector of the covariance), then an
//! algebraic least-squares circle fit runs in plane coordinates. On
//! noiseless input both stages are exact.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Unit, Vector3};
use tracing::debug;

use crate::error::{GuideError, GuideResult};

/// Eigenvalue ratio below which the cloud counts as degenerate.
const DEGENERACY_RATIO: f64 = 1e-12;

/// A fitted circle in 3D.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleFit {
    /// Circle center.
    pub center: Point3<f64>,
    /// Circle radius, millimeters.
    pub radius: f64,
    /// Unit normal of the circle plane.
    pub normal: Unit<Vector3<f64>>,
    /// RMS radial misfit of the input points, millimeters.
    pub residual: f64,
}

/// Fits a circle to a swept point cloud.
///
/// # Errors
///
/// - [`GuideError::InsufficientPoints`] - fewer than 3 points.
/// - [`GuideError::NumericSingularity`] - collinear or coincident points;
///   no circle is determined.
#[allow(clippy::cast_precision_loss)]
pub fn fit_circle(points: &[Point3<f64>]) -> GuideResult<CircleFit> {
    if points.len() < 3 {
        return Err(GuideError::InsufficientPoints {
            required: 3,
            provided: points.len(),
        });
    }
    let count = points.len() as f64;

    let mut centroid = Vector3::zeros();
    for p in points {
        centroid += p.coords;
    }
    centroid /= count;

    let mut covariance = Matrix3::zeros();
    for p in points {
        let d = p.coords - centroid;
        covariance += d * d.transpose();
    }
    covariance /= count;

    // Eigenvalues ascending by index after sorting; the smallest-variance
    // direction is the plane normal, the largest spans the plane.
    let eigen = SymmetricEigen::new(covariance);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let spread = eigen.eigenvalues[order[0]];
    let in_plane = eigen.eigenvalues[order[1]];
    if spread < f64::EPSILON || in_plane / spread < DEGENERACY_RATIO {
        return Err(GuideError::NumericSingularity {
            context: "plane fit",
        });
    }

    let u: Vector3<f64> = eigen.eigenvectors.column(order[0]).into();
    let v: Vector3<f64> = eigen.eigenvectors.column(order[1]).into();
    let normal = Unit::new_normalize(u.cross(&v));

    // Algebraic circle fit in (u, v) plane coordinates relative to the
    // centroid: minimize |a^2 + b^2 - 2*cx*a - 2*cy*b - k| over (cx, cy, k).
    let mut lhs = Matrix3::zeros();
    let mut rhs = Vector3::zeros();
    for p in points {
        let d = p.coords - centroid;
        let a = d.dot(&u);
        let b = d.dot(&v);
        let row = Vector3::new(2.0 * a, 2.0 * b, 1.0);
        lhs += row * row.transpose();
        rhs += row * (a * a + b * b);
    }
    let solution = lhs
        .lu()
        .solve(&rhs)
        .ok_or(GuideError::NumericSingularity {
            context: "circle fit",
        })?;
    let (cx, cy, k) = (solution.x, solution.y, solution.z);

    let radius_sq = k + cx * cx + cy * cy;
    if radius_sq <= 0.0 || !radius_sq.is_finite() {
        return Err(GuideError::NumericSingularity {
            context: "circle fit",
        });
    }
    let radius = radius_sq.sqrt();
    let center = Point3::from(centroid + u * cx + v * cy);

    let residual = (points
        .iter()
        .map(|p| {
            let radial = ((p - center) - normal.into_inner() * (p - center).dot(&normal)).norm();
            (radial - radius).powi(2)
        })
        .sum::<f64>()
        / count)
        .sqrt();

    debug!(radius, residual, "circle fit");
    Ok(CircleFit {
        center,
        radius,
        normal,
        residual,
    })
}
