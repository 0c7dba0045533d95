//! Signed distance queries against a bone surface.
//!
//! Sign convention: positive means outside the bone, negative means inside
//! (an implant check-point with negative distance would be embedded in
//! bone). The sign comes from the closest face's outward normal, which is
//! reliable for the closed, well-behaved surfaces produced by the fitting
//! phase.

use knee_types::BoneMesh;
use nalgebra::{Point3, Vector3};

/// A bone surface prepared for repeated signed distance queries.
///
/// Face normals are cached once; each query is a scan over the faces.
#[derive(Debug)]
pub struct SignedSurface<'a> {
    mesh: &'a BoneMesh,
    face_normals: Vec<Vector3<f64>>,
}

impl<'a> SignedSurface<'a> {
    /// Prepares the surface. Returns `None` if the mesh has no faces.
    #[must_use]
    pub fn new(mesh: &'a BoneMesh) -> Option<Self> {
        if mesh.faces.is_empty() {
            return None;
        }
        let face_normals = mesh
            .faces
            .iter()
            .map(|&[i0, i1, i2]| {
                let v0 = mesh.vertices[i0 as usize];
                let v1 = mesh.vertices[i1 as usize];
                let v2 = mesh.vertices[i2 as usize];
                (v1 - v0)
                    .cross(&(v2 - v0))
                    .try_normalize(f64::EPSILON)
                    .unwrap_or_else(Vector3::z)
            })
            .collect();
        Some(Self { mesh, face_normals })
    }

    /// Signed distance from a point to the surface, millimeters.
    #[must_use]
    pub fn signed_distance(&self, point: Point3<f64>) -> f64 {
        let (distance, face) = self.unsigned_distance_with_face(point);
        let [i0, _, _] = self.mesh.faces[face];
        let to_point = point - self.mesh.vertices[i0 as usize];
        if to_point.dot(&self.face_normals[face]) >= 0.0 {
            distance
        } else {
            -distance
        }
    }

    /// Closest point on the surface to a query point.
    #[must_use]
    pub fn closest_point(&self, point: Point3<f64>) -> Point3<f64> {
        let mut min_dist_sq = f64::MAX;
        let mut closest = point;
        for &[i0, i1, i2] in &self.mesh.faces {
            let candidate = closest_point_on_triangle(
                point,
                self.mesh.vertices[i0 as usize],
                self.mesh.vertices[i1 as usize],
                self.mesh.vertices[i2 as usize],
            );
            let dist_sq = (candidate - point).norm_squared();
            if dist_sq < min_dist_sq {
                min_dist_sq = dist_sq;
                closest = candidate;
            }
        }
        closest
    }

    fn unsigned_distance_with_face(&self, point: Point3<f64>) -> (f64, usize) {
        let mut min_dist_sq = f64::MAX;
        let mut closest_face = 0;
        for (face_idx, &[i0, i1, i2]) in self.mesh.faces.iter().enumerate() {
            let closest = closest_point_on_triangle(
                point,
                self.mesh.vertices[i0 as usize],
                self.mesh.vertices[i1 as usize],
                self.mesh.vertices[i2 as usize],
            );
            let dist_sq = (closest - point).norm_squared();
            if dist_sq < min_dist_sq {
                min_dist_sq = dist_sq;
                closest_face = face_idx;
            }
        }
        (min_dist_sq.sqrt(), closest_face)
    }
}

/// Closest point on a triangle to a query point (Ericson's region test).
#[must_use]
pub fn closest_point_on_triangle(
    point: Point3<f64>,
    v0: Point3<f64>,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> Point3<f64> {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = point - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return v0;
    }

    let bp = point - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return v1;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return v0 + ab * v;
    }

    let cp = point - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return v2;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return v0 + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return v1 + (v2 - v1) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    v0 + ab * v + ac * w
}
