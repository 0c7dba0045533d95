//! Pull-to-landmark radial deformation.
//!
//! After the grid search, the winning dense mesh is nudged so that each
//! landmark-bound vertex lands exactly on its measured target. Each pull is
//! local: vertices within the pull radius of the bound vertex move by a
//! linearly decaying share of the landmark displacement; everything farther
//! away is untouched. Pulls are applied sequentially in target order, so a
//! later landmark may partially undo an earlier one. That is accepted.

use knee_types::{BoneMesh, Landmark};
use tracing::debug;

use crate::error::{ShapeFitError, ShapeFitResult};

/// Radius of influence of one landmark pull, millimeters.
pub const PULL_RADIUS_MM: f64 = 30.0;

/// Result of the deformation pass.
#[derive(Debug, Clone)]
pub struct DeformOutput {
    /// The deformed mesh.
    pub mesh: BoneMesh,
    /// Vertices moved by at least one pull.
    pub vertices_moved: usize,
    /// Largest single-vertex displacement over the whole pass, millimeters.
    pub max_displacement: f64,
}

/// Pulls the mesh toward each target landmark in turn.
///
/// For target `t` bound to vertex `v`, every vertex `w` with
/// `d = |w - v| < radius` is translated by `(1 - d/radius) * (t - v)`.
///
/// # Errors
///
/// Returns [`ShapeFitError::MissingLandmark`] if a target's name is not in
/// the mesh correspondence table.
pub fn pull_to_landmarks(
    mesh: &BoneMesh,
    targets: &[Landmark],
    radius: f64,
) -> ShapeFitResult<DeformOutput> {
    let mut out = mesh.clone();
    let mut moved = vec![false; out.vertex_count()];
    let mut max_displacement = 0.0f64;

    for target in targets {
        let anchor_index =
            out.landmark_vertex(&target.name)
                .ok_or_else(|| ShapeFitError::MissingLandmark {
                    name: target.name.clone(),
                })?;
        let anchor = out.vertices[anchor_index];
        let displacement = target.position - anchor;

        if displacement.norm() == 0.0 {
            continue;
        }

        for (i, vertex) in out.vertices.iter_mut().enumerate() {
            let d = (*vertex - anchor).norm();
            if d < radius {
                let step = displacement * (1.0 - d / radius);
                *vertex += step;
                moved[i] = true;
                max_displacement = max_displacement.max(step.norm());
            }
        }

        debug!(
            landmark = %target.name,
            pull_mm = displacement.norm(),
            "applied landmark pull"
        );
    }

    Ok(DeformOutput {
        mesh: out,
        vertices_moved: moved.iter().filter(|&&m| m).count(),
        max_displacement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use knee_types::{Point3, TrackedBody, Vector3};

    fn line_mesh() -> BoneMesh {
        // Vertices spaced 10 mm apart along x; anchor at the origin.
        let mut mesh = BoneMesh::new();
        for i in 0..8 {
            mesh.vertices.push(Point3::new(f64::from(i) * 10.0, 0.0, 0.0));
        }
        mesh.bind_landmark("anchor", 0).unwrap();
        mesh
    }

    #[test]
    fn pull_to_current_position_is_a_no_op() {
        let mesh = line_mesh();
        let targets = vec![Landmark::new(
            "anchor",
            mesh.vertices[0],
            TrackedBody::Femur,
        )];

        let out = pull_to_landmarks(&mesh, &targets, PULL_RADIUS_MM).unwrap();
        assert_eq!(out.vertices_moved, 0);
        assert_relative_eq!(out.max_displacement, 0.0);
        for (a, b) in out.mesh.vertices.iter().zip(&mesh.vertices) {
            assert_relative_eq!(a, b, epsilon = 1e-15);
        }
    }

    #[test]
    fn vertices_beyond_the_radius_never_move() {
        let mesh = line_mesh();
        let target = Point3::new(0.0, 0.0, 6.0);
        let targets = vec![Landmark::new("anchor", target, TrackedBody::Femur)];

        let out = pull_to_landmarks(&mesh, &targets, PULL_RADIUS_MM).unwrap();
        // Vertices at x = 30, 40, ... are at or beyond 30 mm from the anchor.
        for i in 3..8 {
            assert_relative_eq!(out.mesh.vertices[i], mesh.vertices[i], epsilon = 1e-15);
        }
        assert_eq!(out.vertices_moved, 3);
    }

    #[test]
    fn anchor_lands_exactly_on_target() {
        let mesh = line_mesh();
        let target = Point3::new(2.0, -3.0, 6.0);
        let targets = vec![Landmark::new("anchor", target, TrackedBody::Femur)];

        let out = pull_to_landmarks(&mesh, &targets, PULL_RADIUS_MM).unwrap();
        assert_relative_eq!(out.mesh.vertices[0], target, epsilon = 1e-12);
        assert_relative_eq!(out.max_displacement, (target - mesh.vertices[0]).norm());
    }

    #[test]
    fn influence_decays_linearly_with_distance() {
        let mesh = line_mesh();
        let pull = Vector3::new(0.0, 0.0, 9.0);
        let targets = vec![Landmark::new(
            "anchor",
            mesh.vertices[0] + pull,
            TrackedBody::Femur,
        )];

        let out = pull_to_landmarks(&mesh, &targets, PULL_RADIUS_MM).unwrap();
        // Vertex at 10 mm gets 2/3 of the pull, at 20 mm one third.
        assert_relative_eq!(out.mesh.vertices[1].z, 6.0, epsilon = 1e-12);
        assert_relative_eq!(out.mesh.vertices[2].z, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn later_pulls_may_partially_undo_earlier_ones() {
        let mut mesh = line_mesh();
        mesh.bind_landmark("second", 1).unwrap();

        let up = Landmark::new(
            "anchor",
            mesh.vertices[0] + Vector3::new(0.0, 0.0, 9.0),
            TrackedBody::Femur,
        );
        // Second target asks vertex 1 to return to its original position.
        let back = Landmark::new("second", mesh.vertices[1], TrackedBody::Femur);

        let out = pull_to_landmarks(&mesh, &[up, back], PULL_RADIUS_MM).unwrap();
        // The second pull returned vertex 1 to its original height.
        assert_relative_eq!(out.mesh.vertices[1].z, 0.0, epsilon = 1e-12);
        // And dragged the first anchor off its target in doing so.
        assert!(out.mesh.vertices[0].z < 9.0 - 1e-9);
    }

    #[test]
    fn unknown_landmark_is_rejected() {
        let mesh = line_mesh();
        let targets = vec![Landmark::new(
            "missing",
            Point3::origin(),
            TrackedBody::Femur,
        )];
        let result = pull_to_landmarks(&mesh, &targets, PULL_RADIUS_MM);
        assert!(matches!(
            result,
            Err(ShapeFitError::MissingLandmark { .. })
        ));
    }
}
