//! Discrete coefficient-grid search over the shape model.
//!
//! The search enumerates every combination of per-mode coefficient values,
//! rigidly aligns each candidate's landmark subset to the measured targets,
//! and keeps the candidate with the smallest summed landmark distance. The
//! grid is small enough (5,400 combinations by default) that exhaustive
//! enumeration is cheaper and more predictable than a continuous optimizer.

use knee_registration::rigid_from_landmarks;
use knee_types::{Landmark, Point3, RigidTransform};
use tracing::debug;

use crate::error::{ShapeFitError, ShapeFitResult};
use crate::model::LinearShapeModel;

/// Coefficient magnitude limit, in standard deviations of each mode.
pub const COEFFICIENT_LIMIT: f64 = 2.5;

/// Default per-mode step counts. The product is the candidate count: 5,400.
pub const DEFAULT_STEPS: [usize; 6] = [6, 6, 5, 5, 3, 2];

/// Parameters for the grid search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Coefficients are drawn from `[-limit, +limit]` per mode.
    pub coefficient_limit: f64,
    /// Number of grid values per mode; leading modes get finer grids.
    pub steps_per_mode: Vec<usize>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            coefficient_limit: COEFFICIENT_LIMIT,
            steps_per_mode: DEFAULT_STEPS.to_vec(),
        }
    }
}

impl SearchParams {
    /// Creates parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the coefficient limit.
    #[must_use]
    pub const fn with_coefficient_limit(mut self, limit: f64) -> Self {
        self.coefficient_limit = limit;
        self
    }

    /// Sets the per-mode step counts.
    #[must_use]
    pub fn with_steps_per_mode(mut self, steps: Vec<usize>) -> Self {
        self.steps_per_mode = steps;
        self
    }

    /// Total number of candidates the grid enumerates.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.steps_per_mode.iter().product()
    }
}

/// One scored candidate from the grid search.
#[derive(Debug, Clone)]
pub struct ShapeCandidate {
    /// Per-mode coefficients of the sampled shape.
    pub coefficients: Vec<f64>,
    /// Rigid pose aligning the candidate's landmarks to the targets.
    pub pose: RigidTransform,
    /// Summed per-landmark Euclidean distance after alignment, millimeters.
    pub residual: f64,
}

/// Grid values for one mode. Every grid contains exactly 0 so the mean
/// shape itself is always among the candidates.
fn mode_values(steps: usize, limit: f64) -> Vec<f64> {
    match steps {
        0 | 1 => vec![0.0],
        n if n % 2 == 0 => {
            // Even count: values -limit + k*(2*limit/n), k = 0..n. The
            // midpoint k = n/2 lands on 0; +limit itself is not sampled.
            #[allow(clippy::cast_precision_loss)]
            (0..n)
                .map(|k| -limit + k as f64 * (2.0 * limit / n as f64))
                .collect()
        }
        n => {
            // Odd count: cell midpoints of n equal cells over the range;
            // the center cell's midpoint is 0.
            #[allow(clippy::cast_precision_loss)]
            (0..n)
                .map(|k| (k as f64 + 0.5) * (2.0 * limit / n as f64) - limit)
                .collect()
        }
    }
}

/// Enumerates the coefficient grid and returns the minimum-residual
/// candidate.
///
/// Target order is given by `targets`; each target's name must appear in
/// the model's correspondence table. Only the landmark-bound vertices are
/// sampled per candidate.
///
/// # Errors
///
/// - [`ShapeFitError::MissingLandmark`] - a target has no model
///   correspondence.
/// - [`ShapeFitError::Registration`] - the target set does not admit a
///   unique rigid alignment (fewer than 3 points, collinear).
pub fn search_grid(
    model: &LinearShapeModel,
    targets: &[Landmark],
    params: &SearchParams,
) -> ShapeFitResult<ShapeCandidate> {
    // Map each target to its position in the model's correspondence table.
    let table: Vec<&str> = model.landmark_names().collect();
    let mut order = Vec::with_capacity(targets.len());
    for target in targets {
        let index = table
            .iter()
            .position(|name| *name == target.name)
            .ok_or_else(|| ShapeFitError::MissingLandmark {
                name: target.name.clone(),
            })?;
        order.push(index);
    }
    let target_positions: Vec<Point3<f64>> = targets.iter().map(|l| l.position).collect();

    let grids: Vec<Vec<f64>> = (0..model.mode_count())
        .map(|k| {
            let steps = params.steps_per_mode.get(k).copied().unwrap_or(1);
            mode_values(steps, params.coefficient_limit)
        })
        .collect();

    let mut best: Option<ShapeCandidate> = None;
    let mut indices = vec![0usize; grids.len()];
    let mut coefficients = vec![0.0f64; grids.len()];
    let mut evaluated = 0usize;

    loop {
        for (c, (grid, &i)) in coefficients.iter_mut().zip(grids.iter().zip(&indices)) {
            *c = grid[i];
        }

        let sampled = model.sample_landmarks(&coefficients)?;
        let candidate_positions: Vec<Point3<f64>> = order.iter().map(|&i| sampled[i]).collect();
        let pose = rigid_from_landmarks(&candidate_positions, &target_positions)?;

        let residual: f64 = candidate_positions
            .iter()
            .zip(&target_positions)
            .map(|(p, t)| (pose.transform_point(p) - t).norm())
            .sum();
        evaluated += 1;

        if best.as_ref().map_or(true, |b| residual < b.residual) {
            debug!(evaluated, residual, "new best shape candidate");
            best = Some(ShapeCandidate {
                coefficients: coefficients.clone(),
                pose,
                residual,
            });
        }

        // Odometer increment over the per-mode grids.
        let mut digit = grids.len();
        loop {
            if digit == 0 {
                debug!(evaluated, "grid search complete");
                return best.ok_or_else(|| {
                    ShapeFitError::ModelArtifact("model has no modes".to_string())
                });
            }
            digit -= 1;
            indices[digit] += 1;
            if indices[digit] < grids[digit].len() {
                break;
            }
            indices[digit] = 0;
        }
    }
}
