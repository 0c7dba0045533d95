//! Two-stage shape fitting pipeline.
//!
//! 1. Discrete grid search over the mode coefficients, scored by landmark
//!    residual after rigid alignment.
//! 2. Pull-to-landmark deformation of the winning dense mesh.
//! 3. Optionally, one backend refinement fit of the deformed mesh against
//!    the measured landmark cloud.

use std::path::PathBuf;

use knee_types::{BoneMesh, Landmark, Point3};
use tracing::{debug, info};

use crate::backend::{FitRequest, ShapeModelBackend};
use crate::deform::{pull_to_landmarks, PULL_RADIUS_MM};
use crate::error::{ShapeFitError, ShapeFitResult};
use crate::model::LinearShapeModel;
use crate::search::{search_grid, SearchParams, ShapeCandidate};

/// Parameters for the full fitting pipeline.
#[derive(Debug, Clone)]
pub struct ShapeFitParams {
    /// Grid search configuration.
    pub search: SearchParams,
    /// Pull-to-landmark radius of influence, millimeters (default: 30).
    pub pull_radius: f64,
    /// Regularization weight forwarded to the refinement backend
    /// (default: 0.1).
    pub regularization: f64,
    /// Shape model artifact path forwarded to the refinement backend.
    pub model_path: PathBuf,
}

impl Default for ShapeFitParams {
    fn default() -> Self {
        Self {
            search: SearchParams::default(),
            pull_radius: PULL_RADIUS_MM,
            regularization: 0.1,
            model_path: PathBuf::new(),
        }
    }
}

impl ShapeFitParams {
    /// Creates parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the grid search configuration.
    #[must_use]
    pub fn with_search(mut self, search: SearchParams) -> Self {
        self.search = search;
        self
    }

    /// Sets the pull radius.
    #[must_use]
    pub const fn with_pull_radius(mut self, radius: f64) -> Self {
        self.pull_radius = radius;
        self
    }

    /// Sets the regularization weight.
    #[must_use]
    pub const fn with_regularization(mut self, weight: f64) -> Self {
        self.regularization = weight;
        self
    }

    /// Sets the model artifact path handed to the backend.
    #[must_use]
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }
}

/// Result of the fitting pipeline.
#[derive(Debug, Clone)]
pub struct FitOutput {
    /// The patient-specific bone mesh.
    pub mesh: BoneMesh,
    /// The winning grid-search candidate.
    pub candidate: ShapeCandidate,
    /// Vertices moved by the deformation pass.
    pub vertices_moved: usize,
    /// Whether the backend refinement ran and was applied.
    pub refined: bool,
}

/// Runs the full fitting pipeline against the measured landmark targets.
///
/// When `backend` is `None` the result is the deformed grid-search winner.
/// When a backend is supplied, the deformed mesh is re-submitted for one
/// refinement fit; the landmark correspondence table is carried over when
/// the backend preserves the vertex count.
///
/// # Errors
///
/// Propagates grid-search, deformation, and backend errors; any of them
/// aborts the fitting phase.
pub fn fit_shape(
    model: &LinearShapeModel,
    targets: &[Landmark],
    params: &ShapeFitParams,
    backend: Option<&dyn ShapeModelBackend>,
) -> ShapeFitResult<FitOutput> {
    let candidate = search_grid(model, targets, &params.search)?;
    info!(
        residual = candidate.residual,
        coefficients = ?candidate.coefficients,
        "grid search selected shape candidate"
    );

    let dense = model.sample(&candidate.coefficients)?;
    let posed = dense.transformed(&candidate.pose);
    let deformed = pull_to_landmarks(&posed, targets, params.pull_radius)?;
    debug!(
        vertices_moved = deformed.vertices_moved,
        max_displacement = deformed.max_displacement,
        "landmark deformation applied"
    );

    let mut mesh = deformed.mesh;
    let mut refined = false;
    if let Some(backend) = backend {
        let moving: Vec<Point3<f64>> = targets
            .iter()
            .map(|t| {
                mesh.landmark_position(&t.name)
                    .ok_or_else(|| ShapeFitError::MissingLandmark {
                        name: t.name.clone(),
                    })
            })
            .collect::<ShapeFitResult<_>>()?;
        let request = FitRequest {
            model_path: params.model_path.clone(),
            fixed_landmarks: targets.iter().map(|t| t.position).collect(),
            moving_landmarks: moving,
            regularization: params.regularization,
            template: mesh.clone(),
        };

        let fitted = backend.fit(&request)?;
        info!(vertices = fitted.vertex_count(), "backend refinement applied");
        mesh = if fitted.correspondences.is_empty()
            && fitted.vertex_count() == request.template.vertex_count()
        {
            // Exchange formats drop the correspondence table; restore it
            // from the template when the vertex count is unchanged.
            BoneMesh {
                correspondences: request.template.correspondences.clone(),
                ..fitted
            }
        } else {
            fitted
        };
        refined = true;
    }

    Ok(FitOutput {
        mesh,
        candidate,
        vertices_moved: deformed.vertices_moved,
        refined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use knee_types::{TrackedBody, Vector3};

    fn tetra_model() -> LinearShapeModel {
        let mut mean = BoneMesh::new();
        mean.vertices.push(Point3::new(0.0, 0.0, 0.0));
        mean.vertices.push(Point3::new(40.0, 0.0, 0.0));
        mean.vertices.push(Point3::new(0.0, 40.0, 0.0));
        mean.vertices.push(Point3::new(0.0, 0.0, 40.0));
        mean.faces.push([0, 1, 2]);
        mean.faces.push([0, 1, 3]);
        for (name, vertex) in [("hip", 0), ("knee", 1), ("ankle", 2), ("condyle", 3)] {
            mean.bind_landmark(name, vertex).unwrap();
        }
        let modes = vec![vec![Vector3::new(2.0, 0.0, 0.0); 4]];
        LinearShapeModel::new(mean, modes).unwrap()
    }

    fn mean_targets(model: &LinearShapeModel) -> Vec<Landmark> {
        model
            .mean()
            .correspondences
            .iter()
            .map(|c| {
                Landmark::new(
                    c.name.clone(),
                    model.mean().vertices[c.vertex],
                    TrackedBody::Femur,
                )
            })
            .collect()
    }

    #[test]
    fn targets_at_mean_reproduce_the_mean_shape() {
        let model = tetra_model();
        let targets = mean_targets(&model);
        let params = ShapeFitParams::new().with_search(
            SearchParams::new().with_steps_per_mode(vec![6]),
        );

        let out = fit_shape(&model, &targets, &params, None).unwrap();
        assert!(out.candidate.residual < 1e-9);
        assert!(!out.refined);
        for (a, b) in out.mesh.vertices.iter().zip(&model.mean().vertices) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn in_process_refinement_preserves_correspondences() {
        let model = tetra_model();
        let targets = mean_targets(&model);
        let params = ShapeFitParams::new().with_search(
            SearchParams::new().with_steps_per_mode(vec![6]),
        );

        let out = fit_shape(&model, &targets, &params, Some(&model)).unwrap();
        assert!(out.refined);
        assert_eq!(out.mesh.correspondences.len(), 4);
        assert!(out.mesh.landmark_position("condyle").is_some());
    }

    #[test]
    fn deformation_moves_vertices_toward_off_grid_targets() {
        let model = tetra_model();
        let mut targets = mean_targets(&model);
        // Nudge one landmark off every sampled shape.
        targets[3].position += Vector3::new(0.0, 0.0, 1.7);

        let params = ShapeFitParams::new().with_search(
            SearchParams::new().with_steps_per_mode(vec![6]),
        );
        let out = fit_shape(&model, &targets, &params, None).unwrap();
        assert!(out.vertices_moved > 0);
        // The bound vertex landed on its target.
        let fitted = out.mesh.landmark_position("condyle").unwrap();
        assert_relative_eq!(fitted, targets[3].position, epsilon = 1e-9);
    }
}
