//! Rigid iterative closest point refinement against a bone surface.
//!
//! Each iteration finds the nearest surface vertex for every moving point
//! (KD-tree accelerated) and re-solves the rigid update with the
//! closed-form Kabsch solver. The best transform found is always returned,
//! together with its residual, so the caller can decide whether the fit is
//! acceptable.

use kiddo::{KdTree, SquaredEuclidean};
use knee_types::{BoneMesh, RigidTransform};
use nalgebra::Point3;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{RegistrationError, RegistrationResult};
use crate::kabsch::rigid_from_landmarks;

/// Parameters for ICP refinement.
#[derive(Debug, Clone)]
pub struct IcpParams {
    /// Maximum number of iterations (default: 50).
    pub max_iterations: u32,
    /// Convergence threshold on the RMS residual change between iterations
    /// (default: 1e-6 mm).
    pub convergence_threshold: f64,
    /// Correspondences farther than this are rejected. `None` disables the
    /// gate (default: `None`).
    pub max_correspondence_distance: Option<f64>,
    /// Initial transform guess (default: identity).
    pub initial_transform: RigidTransform,
}

impl Default for IcpParams {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            convergence_threshold: 1e-6,
            max_correspondence_distance: None,
            initial_transform: RigidTransform::identity(),
        }
    }
}

impl IcpParams {
    /// Creates parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence threshold.
    #[must_use]
    pub const fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Sets the maximum correspondence distance.
    #[must_use]
    pub const fn with_max_correspondence_distance(mut self, distance: f64) -> Self {
        self.max_correspondence_distance = Some(distance);
        self
    }

    /// Sets the initial transform guess.
    #[must_use]
    pub const fn with_initial_transform(mut self, transform: RigidTransform) -> Self {
        self.initial_transform = transform;
        self
    }
}

/// Result of ICP refinement.
#[derive(Debug, Clone)]
pub struct IcpResult {
    /// The best rigid transform found (moving cloud to surface).
    pub transform: RigidTransform,
    /// RMS residual of the best iteration, millimeters.
    pub residual: f64,
    /// Number of iterations performed.
    pub iterations: u32,
    /// Whether the residual change dropped below the threshold.
    pub converged: bool,
    /// Valid correspondences in the final iteration.
    pub correspondence_count: usize,
}

/// Refines the alignment of a moving point cloud against a bone surface.
///
/// Runs rigid-only ICP: nearest-vertex correspondences are re-solved with
/// the closed-form Kabsch update each iteration. Terminates on
/// `max_iterations` or when the residual change drops below the tolerance;
/// the best transform seen is always returned with its residual so the
/// caller can reject a poor fit.
///
/// # Errors
///
/// - [`RegistrationError::EmptySurface`] - the surface has no vertices.
/// - [`RegistrationError::InsufficientPoints`] - fewer than 3 moving points.
/// - [`RegistrationError::NoCorrespondences`] - the distance gate rejected
///   every pairing.
pub fn refine_icp(
    moving: &[Point3<f64>],
    surface: &BoneMesh,
    params: &IcpParams,
) -> RegistrationResult<IcpResult> {
    if surface.is_empty() {
        return Err(RegistrationError::EmptySurface);
    }
    if moving.len() < 3 {
        return Err(RegistrationError::InsufficientPoints {
            required: 3,
            provided: moving.len(),
        });
    }

    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (i, p) in surface.vertices.iter().enumerate() {
        tree.add(&[p.x, p.y, p.z], i as u64);
    }

    let max_dist_sq = params
        .max_correspondence_distance
        .map_or(f64::MAX, |d| d * d);

    let mut current = params.initial_transform;
    let mut best = current;
    let mut best_residual = f64::MAX;
    let mut prev_residual = f64::MAX;
    let mut converged = false;
    let mut iterations = 0;
    let mut final_count = 0;

    for iter in 0..params.max_iterations {
        iterations = iter + 1;

        let transformed: Vec<Point3<f64>> =
            moving.iter().map(|p| current.transform_point(p)).collect();

        // Nearest-vertex correspondences, gated by distance.
        let correspondences: Vec<(usize, Point3<f64>, f64)> = transformed
            .par_iter()
            .enumerate()
            .filter_map(|(idx, p)| {
                let nearest = tree.nearest_one::<SquaredEuclidean>(&[p.x, p.y, p.z]);
                if nearest.distance <= max_dist_sq {
                    #[allow(clippy::cast_possible_truncation)]
                    let target_idx = nearest.item as usize;
                    Some((idx, surface.vertices[target_idx], nearest.distance))
                } else {
                    None
                }
            })
            .collect();

        if correspondences.is_empty() {
            return Err(RegistrationError::NoCorrespondences);
        }
        final_count = correspondences.len();

        let (matched_moving, matched_surface): (Vec<Point3<f64>>, Vec<Point3<f64>>) =
            correspondences
                .iter()
                .map(|(idx, target, _)| (transformed[*idx], *target))
                .unzip();

        let incremental = rigid_from_landmarks(&matched_moving, &matched_surface)?;
        current = incremental.compose(&current);

        #[allow(clippy::cast_precision_loss)]
        let residual = (correspondences.iter().map(|(_, _, d)| d).sum::<f64>()
            / correspondences.len() as f64)
            .sqrt();

        if residual < best_residual {
            best_residual = residual;
            best = current;
        }

        debug!(iteration = iterations, residual, "icp iteration");

        if (prev_residual - residual).abs() < params.convergence_threshold {
            converged = true;
            break;
        }
        prev_residual = residual;
    }

    Ok(IcpResult {
        transform: best,
        residual: best_residual,
        iterations,
        converged,
        correspondence_count: final_count,
    })
}
