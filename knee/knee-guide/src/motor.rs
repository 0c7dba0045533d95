//! Two-motor inverse kinematics for the cutting guide.
//!
//! Motor 2 rides on a fixed-radius circle around motor 1. Orienting the
//! guide for a cut means intersecting that circle with the line along the
//! desired resection direction and driving motor 2 to the intersection.
//! When the line crosses the circle twice, which root to take depends on
//! the cut being prepared, so the tie-break is an explicit argument.

use nalgebra::{Point3, Unit, Vector3};
use tracing::debug;

use crate::error::{GuideError, GuideResult};

/// Root selection policy when the target line crosses the motor circle
/// twice. Chosen per cut at the call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TieBreak {
    /// Take the root closest to the previous motor target.
    NearestPrevious(Point3<f64>),
    /// Take the root with the larger y coordinate.
    MaxY,
    /// Take the root with the smaller y coordinate.
    MinY,
}

/// Intersects the motor circle with the target-direction line and picks
/// the next motor-2 position.
///
/// The circle lies in the plane through `center` with `normal`; the line
/// runs through `line_origin` along `line_dir`. Both the line origin and
/// direction are projected into the circle plane first, so a slightly
/// out-of-plane target direction is tolerated.
///
/// # Errors
///
/// - [`GuideError::NumericSingularity`] - the projected direction is
///   near zero (target direction parallel to the circle normal).
/// - [`GuideError::NoIntersection`] - the line misses the circle.
pub fn solve_motor_target(
    center: Point3<f64>,
    radius: f64,
    normal: Unit<Vector3<f64>>,
    line_origin: Point3<f64>,
    line_dir: Vector3<f64>,
    tie_break: TieBreak,
) -> GuideResult<Point3<f64>> {
    // Project the line into the circle plane.
    let origin_offset = line_origin - center;
    let origin_in_plane = origin_offset - normal.into_inner() * origin_offset.dot(&normal);
    let dir_in_plane = line_dir - normal.into_inner() * line_dir.dot(&normal);

    let a = dir_in_plane.norm_squared();
    if a < 1e-18 {
        return Err(GuideError::NumericSingularity {
            context: "motor line projection",
        });
    }
    let b = 2.0 * origin_in_plane.dot(&dir_in_plane);
    let c = origin_in_plane.norm_squared() - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        let foot = origin_in_plane - dir_in_plane * (origin_in_plane.dot(&dir_in_plane) / a);
        return Err(GuideError::NoIntersection {
            miss_mm: foot.norm() - radius,
        });
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);
    let point_at = |t: f64| center + origin_in_plane + dir_in_plane * t;
    let p1 = point_at(t1);
    let p2 = point_at(t2);

    let chosen = match tie_break {
        TieBreak::NearestPrevious(previous) => {
            if (p1 - previous).norm_squared() <= (p2 - previous).norm_squared() {
                p1
            } else {
                p2
            }
        }
        TieBreak::MaxY => {
            if p1.y >= p2.y {
                p1
            } else {
                p2
            }
        }
        TieBreak::MinY => {
            if p1.y <= p2.y {
                p1
            } else {
                p2
            }
        }
    };
    debug!(?tie_break, "motor target solved");
    Ok(chosen)
}

/// Signed rotation angle, radians, carrying `from` onto `to` about `axis`.
///
/// Both vectors are projected onto the plane perpendicular to the axis;
/// the sign follows the right-hand rule about `axis`.
///
/// # Errors
///
/// Returns [`GuideError::NumericSingularity`] if either projection is
/// near zero (vector parallel to the axis).
pub fn signed_rotation_angle(
    from: &Vector3<f64>,
    to: &Vector3<f64>,
    axis: &Unit<Vector3<f64>>,
) -> GuideResult<f64> {
    let project = |v: &Vector3<f64>| v - axis.into_inner() * v.dot(axis);
    let f = project(from);
    let t = project(to);
    if f.norm_squared() < 1e-18 || t.norm_squared() < 1e-18 {
        return Err(GuideError::NumericSingularity {
            context: "rotation angle projection",
        });
    }
    Ok(f.cross(&t).dot(axis).atan2(f.dot(&t)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn z_normal() -> Unit<Vector3<f64>> {
        Unit::new_normalize(Vector3::z())
    }

    #[test]
    fn picks_root_nearest_previous_target() {
        // Line along y through the center: roots at y = -5 and y = +5.
        let target = solve_motor_target(
            Point3::origin(),
            5.0,
            z_normal(),
            Point3::new(0.0, -10.0, 0.0),
            Vector3::y(),
            TieBreak::NearestPrevious(Point3::new(0.5, -4.0, 0.0)),
        )
        .unwrap();
        assert_relative_eq!(target, Point3::new(0.0, -5.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn max_y_and_min_y_pick_opposite_roots() {
        let center = Point3::new(2.0, 1.0, 0.0);
        let origin = Point3::new(2.0, -20.0, 0.0);

        let high = solve_motor_target(
            center,
            5.0,
            z_normal(),
            origin,
            Vector3::y(),
            TieBreak::MaxY,
        )
        .unwrap();
        let low = solve_motor_target(
            center,
            5.0,
            z_normal(),
            origin,
            Vector3::y(),
            TieBreak::MinY,
        )
        .unwrap();
        assert_relative_eq!(high, Point3::new(2.0, 6.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(low, Point3::new(2.0, -4.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn tangent_line_yields_the_single_root() {
        // Line along x at y = 5, tangent to the radius-5 circle.
        let target = solve_motor_target(
            Point3::origin(),
            5.0,
            z_normal(),
            Point3::new(-8.0, 5.0, 0.0),
            Vector3::x(),
            TieBreak::MaxY,
        )
        .unwrap();
        assert_relative_eq!(target, Point3::new(0.0, 5.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn missing_line_is_an_error() {
        let result = solve_motor_target(
            Point3::origin(),
            5.0,
            z_normal(),
            Point3::new(-8.0, 9.0, 0.0),
            Vector3::x(),
            TieBreak::MaxY,
        );
        assert!(matches!(result, Err(GuideError::NoIntersection { .. })));
    }

    #[test]
    fn direction_along_the_normal_is_singular() {
        let result = solve_motor_target(
            Point3::origin(),
            5.0,
            z_normal(),
            Point3::new(1.0, 0.0, 0.0),
            Vector3::z(),
            TieBreak::MaxY,
        );
        assert!(matches!(
            result,
            Err(GuideError::NumericSingularity { .. })
        ));
    }

    #[test]
    fn out_of_plane_target_is_projected() {
        // A slightly tilted direction still lands on the circle.
        let target = solve_motor_target(
            Point3::origin(),
            5.0,
            z_normal(),
            Point3::new(0.0, 0.0, 3.0),
            Vector3::new(0.0, 1.0, 0.2),
            TieBreak::MaxY,
        )
        .unwrap();
        assert_relative_eq!(target, Point3::new(0.0, 5.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn rotation_angle_follows_right_hand_rule() {
        let axis = z_normal();
        let angle = signed_rotation_angle(&Vector3::x(), &Vector3::y(), &axis).unwrap();
        assert_relative_eq!(angle, FRAC_PI_2, epsilon = 1e-12);

        let back = signed_rotation_angle(&Vector3::y(), &Vector3::x(), &axis).unwrap();
        assert_relative_eq!(back, -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn rotation_angle_ignores_axis_components() {
        let axis = z_normal();
        let angle = signed_rotation_angle(
            &Vector3::new(1.0, 0.0, 4.0),
            &Vector3::new(0.0, 1.0, -2.0),
            &axis,
        )
        .unwrap();
        assert_relative_eq!(angle, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn vector_parallel_to_axis_is_singular() {
        let axis = z_normal();
        let result = signed_rotation_angle(&Vector3::z(), &Vector3::x(), &axis);
        assert!(matches!(
            result,
            Err(GuideError::NumericSingularity { .. })
        ));
    }
}
