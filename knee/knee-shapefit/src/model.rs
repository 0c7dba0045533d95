//! Linear statistical shape model: mean shape plus a ranked mode basis.
//!
//! The model is stored on disk as a JSON artifact holding the mean mesh
//! (with its landmark correspondence table) and one per-vertex displacement
//! field per mode. Sampling is a linear combination:
//!
//! `vertex_i(c) = mean_i + sum_k c_k * mode_k[i]`

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use knee_types::{BoneMesh, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{ShapeFitError, ShapeFitResult};

/// On-disk form of a shape model.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShapeModelArtifact {
    /// Mean shape, including faces and the landmark correspondence table.
    pub mean: BoneMesh,
    /// Per-mode, per-vertex displacement fields.
    pub modes: Vec<Vec<Vector3<f64>>>,
}

/// A mean shape plus its leading variation modes, sampled in-process.
#[derive(Debug, Clone)]
pub struct LinearShapeModel {
    mean: BoneMesh,
    modes: Vec<Vec<Vector3<f64>>>,
}

impl LinearShapeModel {
    /// Builds a model from a mean mesh and per-vertex mode displacements.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeFitError::ModelArtifact`] if the mean is empty, has no
    /// landmark correspondences, or any mode's length does not match the
    /// vertex count.
    pub fn new(mean: BoneMesh, modes: Vec<Vec<Vector3<f64>>>) -> ShapeFitResult<Self> {
        if mean.is_empty() {
            return Err(ShapeFitError::ModelArtifact(
                "mean shape has no vertices".to_string(),
            ));
        }
        if mean.correspondences.is_empty() {
            return Err(ShapeFitError::ModelArtifact(
                "mean shape has no landmark correspondences".to_string(),
            ));
        }
        for (k, mode) in modes.iter().enumerate() {
            if mode.len() != mean.vertex_count() {
                return Err(ShapeFitError::ModelArtifact(format!(
                    "mode {k} has {} displacements for {} vertices",
                    mode.len(),
                    mean.vertex_count()
                )));
            }
        }
        Ok(Self { mean, modes })
    }

    /// Loads a model from a JSON artifact on disk.
    ///
    /// # Errors
    ///
    /// Any failure here is [`ShapeFitError::ModelArtifact`]: the artifact is
    /// the one input the fitting phase cannot proceed without.
    pub fn from_artifact<P: AsRef<Path>>(path: P) -> ShapeFitResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ShapeFitError::ModelArtifact(format!("{}: {e}", path.display())))?;
        let artifact: ShapeModelArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ShapeFitError::ModelArtifact(format!("{}: {e}", path.display())))?;
        Self::new(artifact.mean, artifact.modes)
    }

    /// The mean shape.
    #[must_use]
    pub const fn mean(&self) -> &BoneMesh {
        &self.mean
    }

    /// Number of variation modes.
    #[must_use]
    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    /// Landmark names carried by the model's correspondence table.
    pub fn landmark_names(&self) -> impl Iterator<Item = &str> {
        self.mean.correspondences.iter().map(|c| c.name.as_str())
    }

    /// Samples a single vertex at the given coefficients.
    fn sample_vertex(&self, index: usize, coefficients: &[f64]) -> Point3<f64> {
        let mut position = self.mean.vertices[index];
        for (c, mode) in coefficients.iter().zip(&self.modes) {
            position += mode[index] * *c;
        }
        position
    }

    /// Samples only the correspondence vertices, in table order.
    ///
    /// The grid search scores thousands of candidates; it only ever needs
    /// the handful of landmark-bound vertices, not the dense mesh.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeFitError::CoefficientCount`] on a length mismatch.
    pub fn sample_landmarks(&self, coefficients: &[f64]) -> ShapeFitResult<Vec<Point3<f64>>> {
        self.check_coefficients(coefficients)?;
        Ok(self
            .mean
            .correspondences
            .iter()
            .map(|c| self.sample_vertex(c.vertex, coefficients))
            .collect())
    }

    /// Samples the dense mesh at the given coefficients.
    ///
    /// Faces and the correspondence table are inherited from the mean.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeFitError::CoefficientCount`] on a length mismatch.
    pub fn sample(&self, coefficients: &[f64]) -> ShapeFitResult<BoneMesh> {
        self.check_coefficients(coefficients)?;
        let mut mesh = self.mean.clone();
        for (i, v) in mesh.vertices.iter_mut().enumerate() {
            for (c, mode) in coefficients.iter().zip(&self.modes) {
                *v += mode[i] * *c;
            }
        }
        Ok(mesh)
    }

    fn check_coefficients(&self, coefficients: &[f64]) -> ShapeFitResult<()> {
        if coefficients.len() == self.modes.len() {
            Ok(())
        } else {
            Err(ShapeFitError::CoefficientCount {
                expected: self.modes.len(),
                provided: coefficients.len(),
            })
        }
    }
}
