//! Closed-form rigid transform between paired point sets.
//!
//! The Kabsch algorithm finds the rotation minimizing the RMSD between two
//! corresponding point sets via SVD of their cross-covariance matrix.

use knee_types::RigidTransform;
use nalgebra::{Matrix3, Point3, Rotation3, UnitQuaternion, Vector3};

use crate::error::{RegistrationError, RegistrationResult};

/// Relative singular-value threshold below which the configuration is
/// treated as collinear (no unique rotation).
const COLLINEARITY_EPSILON: f64 = 1e-9;

/// Computes the least-squares rigid transform aligning `source` to `target`.
///
/// Centroids are removed, the cross-covariance matrix is factored by SVD,
/// and a reflection is corrected to guarantee a proper rotation
/// (determinant +1).
///
/// # Errors
///
/// - [`RegistrationError::InsufficientPoints`] - fewer than 3 pairs, or
///   mismatched lengths.
/// - [`RegistrationError::DegenerateLandmarks`] - collinear or coincident
///   points; no unique rotation exists.
/// - [`RegistrationError::SvdFailed`] - the decomposition produced no
///   factors.
pub fn rigid_from_landmarks(
    source: &[Point3<f64>],
    target: &[Point3<f64>],
) -> RegistrationResult<RigidTransform> {
    if source.len() < 3 || source.len() != target.len() {
        return Err(RegistrationError::InsufficientPoints {
            required: 3,
            provided: source.len().min(target.len()),
        });
    }

    let source_centroid = centroid(source);
    let target_centroid = centroid(target);

    let source_centered: Vec<Vector3<f64>> =
        source.iter().map(|p| p.coords - source_centroid).collect();
    let target_centered: Vec<Vector3<f64>> =
        target.iter().map(|p| p.coords - target_centroid).collect();

    // Cross-covariance H = sum(source_i * target_i^T).
    let mut h = Matrix3::zeros();
    for (s, t) in source_centered.iter().zip(target_centered.iter()) {
        h += s * t.transpose();
    }

    let svd = h.svd(true, true);
    let u = svd.u.ok_or(RegistrationError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(RegistrationError::SvdFailed)?;

    // Collinear or coincident sets leave the covariance rank-deficient: the
    // rotation about the surviving axis is unconstrained.
    let sv = svd.singular_values;
    if sv[0] < COLLINEARITY_EPSILON || sv[1] < sv[0] * COLLINEARITY_EPSILON {
        return Err(RegistrationError::DegenerateLandmarks);
    }

    // R = V * U^T, with the reflection case (det = -1) corrected by
    // flipping the last column of V.
    let mut rotation_matrix = v_t.transpose() * u.transpose();
    if rotation_matrix.determinant() < 0.0 {
        let mut v = v_t.transpose();
        for i in 0..3 {
            v[(i, 2)] = -v[(i, 2)];
        }
        rotation_matrix = v * u.transpose();
    }

    let rotation =
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation_matrix));
    let translation = target_centroid - rotation * source_centroid;

    Ok(RigidTransform::new(rotation, translation))
}

fn centroid(points: &[Point3<f64>]) -> Vector3<f64> {
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    points.iter().map(|p| p.coords).sum::<Vector3<f64>>() / n
}
