//! Bone surface mesh with a named-vertex correspondence table.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::RigidTransform;

/// A correspondence entry binding an anatomical name to a mesh vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamedVertex {
    /// Anatomical landmark name.
    pub name: String,
    /// Index into the mesh vertex array.
    pub vertex: usize,
}

/// A dense bone surface produced by the shape-fitting phase.
///
/// The mesh stores a vertex cloud, optional triangle faces, and a small
/// fixed correspondence table mapping named anatomical landmarks to vertex
/// indices. It is written once by the fitting phase and consumed read-only
/// by implant selection and the alignment engine.
///
/// # Example
///
/// ```
/// use knee_types::BoneMesh;
/// use nalgebra::Point3;
///
/// let mut mesh = BoneMesh::new();
/// mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(10.0, 0.0, 0.0));
/// mesh.bind_landmark("medial_epicondyle", 1).unwrap();
///
/// assert_eq!(mesh.landmark_vertex("medial_epicondyle"), Some(1));
/// assert_eq!(mesh.vertex_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoneMesh {
    /// Vertex positions in millimeters.
    pub vertices: Vec<Point3<f64>>,
    /// Triangle faces as indices into the vertex array (may be empty for
    /// pure point clouds).
    pub faces: Vec<[u32; 3]>,
    /// Named landmark correspondences.
    pub correspondences: Vec<NamedVertex>,
}

impl BoneMesh {
    /// Creates an empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            correspondences: Vec::new(),
        }
    }

    /// Creates a mesh from vertices and faces with no correspondences.
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            correspondences: Vec::new(),
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangle faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns true if the mesh has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Binds an anatomical name to a vertex index.
    ///
    /// Returns `None` (and leaves the table unchanged) if the index is out
    /// of bounds; rebinding an existing name replaces the old entry.
    pub fn bind_landmark(&mut self, name: impl Into<String>, vertex: usize) -> Option<()> {
        if vertex >= self.vertices.len() {
            return None;
        }
        let name = name.into();
        self.correspondences.retain(|c| c.name != name);
        self.correspondences.push(NamedVertex { name, vertex });
        Some(())
    }

    /// Looks up the vertex index bound to an anatomical name.
    #[must_use]
    pub fn landmark_vertex(&self, name: &str) -> Option<usize> {
        self.correspondences
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.vertex)
    }

    /// Looks up the position of a named landmark vertex.
    #[must_use]
    pub fn landmark_position(&self, name: &str) -> Option<Point3<f64>> {
        self.landmark_vertex(name)
            .and_then(|i| self.vertices.get(i))
            .copied()
    }

    /// Positions of all correspondence vertices, in table order.
    #[must_use]
    pub fn correspondence_positions(&self) -> Vec<Point3<f64>> {
        self.correspondences
            .iter()
            .filter_map(|c| self.vertices.get(c.vertex))
            .copied()
            .collect()
    }

    /// Centroid of the vertex cloud, or the origin for an empty mesh.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .vertices
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Returns a copy of this mesh with every vertex transformed.
    ///
    /// Faces and the correspondence table are preserved unchanged.
    #[must_use]
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|p| transform.transform_point(p))
                .collect(),
            faces: self.faces.clone(),
            correspondences: self.correspondences.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn two_point_mesh() -> BoneMesh {
        let mut mesh = BoneMesh::new();
        mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
        mesh.vertices.push(Point3::new(10.0, 0.0, 0.0));
        mesh
    }

    #[test]
    fn bind_and_lookup() {
        let mut mesh = two_point_mesh();
        assert!(mesh.bind_landmark("tip", 1).is_some());
        assert_eq!(mesh.landmark_vertex("tip"), Some(1));
        assert_eq!(mesh.landmark_vertex("missing"), None);
        let pos = mesh.landmark_position("tip").unwrap();
        assert_relative_eq!(pos.x, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn bind_out_of_bounds_is_rejected() {
        let mut mesh = two_point_mesh();
        assert!(mesh.bind_landmark("tip", 5).is_none());
        assert!(mesh.correspondences.is_empty());
    }

    #[test]
    fn rebind_replaces_entry() {
        let mut mesh = two_point_mesh();
        mesh.bind_landmark("tip", 0).unwrap();
        mesh.bind_landmark("tip", 1).unwrap();
        assert_eq!(mesh.correspondences.len(), 1);
        assert_eq!(mesh.landmark_vertex("tip"), Some(1));
    }

    #[test]
    fn centroid_of_cloud() {
        let mesh = two_point_mesh();
        let c = mesh.centroid();
        assert_relative_eq!(c.x, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn transformed_preserves_correspondences() {
        let mut mesh = two_point_mesh();
        mesh.bind_landmark("tip", 1).unwrap();
        let shift = RigidTransform::from_translation(Vector3::new(0.0, 5.0, 0.0));
        let moved = mesh.transformed(&shift);

        assert_eq!(moved.landmark_vertex("tip"), Some(1));
        assert_relative_eq!(moved.vertices[1].y, 5.0, epsilon = 1e-12);
        assert_eq!(moved.face_count(), 0);
    }
}
