//! Live alignment engine.
//!
//! The engine is constructed with every entity it measures: the two
//! anatomical frames, the resection plane, the condylar reference points,
//! and the arena id chains of the tracked body poses. Nothing is looked up
//! by name at measurement time.
//!
//! Angle conventions (tibial frame axes, x lateral / y anterior / z
//! mechanical):
//!
//! - varus/valgus: femoral mechanical axis projected onto the tibial
//!   frontal plane (normal y), measured against the tibial mechanical
//!   axis, sign from the lateral axis.
//! - flexion: same construction in the sagittal plane (normal x), sign
//!   from the anterior axis.
//!
//! When a projection collapses (femoral axis parallel to the plane
//! normal) the angle is reported as 0 rather than NaN; the arccos argument
//! is always clamped to `[-1, 1]`.

use knee_frames::AnatomicalFrame;
use knee_types::{Plane, Point3, RigidTransform, Unit, Vector3};
use tracing::trace;

use crate::arena::{TransformArena, TransformId};
use crate::error::AlignResult;
use crate::sample::AlignmentSample;

/// Default throttle: process every 50th raw pose update.
pub const DEFAULT_THROTTLE: u32 = 50;

/// Projection norm below which an angle is reported as 0.
const PROJECTION_EPSILON: f64 = 1e-9;

/// One tracked body as the engine sees it: its anatomical frame (bone-local)
/// and the arena chain producing its current world pose.
#[derive(Debug, Clone)]
pub struct BodyHandles {
    /// Anatomical frame in bone-local coordinates.
    pub frame: AnatomicalFrame,
    /// Pose chain, root first, evaluated through the arena per update.
    pub chain: Vec<TransformId>,
}

/// Medial and lateral condylar reference points, femur-local.
#[derive(Debug, Clone, Copy)]
pub struct CondylarPoints {
    /// Medial condyle, millimeters.
    pub medial: Point3<f64>,
    /// Lateral condyle, millimeters.
    pub lateral: Point3<f64>,
}

/// Engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Process every Nth raw pose update.
    pub throttle: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            throttle: DEFAULT_THROTTLE,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the throttle divisor (minimum 1).
    #[must_use]
    pub const fn with_throttle(mut self, throttle: u32) -> Self {
        self.throttle = if throttle == 0 { 1 } else { throttle };
        self
    }
}

/// Converts tracked poses into clinical angles and gaps.
#[derive(Debug)]
pub struct AlignmentEngine {
    femur: BodyHandles,
    tibia: BodyHandles,
    /// Resection plane, tibia-local.
    resection_plane: Plane,
    condyles: CondylarPoints,
    throttle: u32,
    update_count: u64,
}

impl AlignmentEngine {
    /// Creates an engine over the given typed handles.
    #[must_use]
    pub fn new(
        femur: BodyHandles,
        tibia: BodyHandles,
        resection_plane: Plane,
        condyles: CondylarPoints,
        config: EngineConfig,
    ) -> Self {
        Self {
            femur,
            tibia,
            resection_plane,
            condyles,
            throttle: config.throttle.max(1),
            update_count: 0,
        }
    }

    /// Handles one raw pose update.
    ///
    /// Returns `Ok(None)` for updates skipped by the throttle; every Nth
    /// call produces a sample. The first call is always processed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AlignError::UnknownTransform`] if a pose chain
    /// references an id the arena does not hold.
    pub fn on_pose_update(
        &mut self,
        arena: &TransformArena,
        timestamp_ms: u64,
    ) -> AlignResult<Option<AlignmentSample>> {
        let count = self.update_count;
        self.update_count += 1;
        if count % u64::from(self.throttle) != 0 {
            trace!(count, "pose update throttled");
            return Ok(None);
        }
        self.measure(arena, timestamp_ms).map(Some)
    }

    /// Measures angles and gaps for the current arena state, bypassing the
    /// throttle. Pure in the poses: identical poses give identical samples.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AlignError::UnknownTransform`] if a pose chain
    /// references an id the arena does not hold.
    pub fn measure(
        &self,
        arena: &TransformArena,
        timestamp_ms: u64,
    ) -> AlignResult<AlignmentSample> {
        let femur_pose = arena.compose(&self.femur.chain)?;
        let tibia_pose = arena.compose(&self.tibia.chain)?;

        // World-space femoral mechanical axis and tibial triad.
        let femoral_axis = femur_pose.transform_vector(&self.femur.frame.mechanical_axis());
        let tibial_x = tibia_pose.transform_vector(&self.tibia.frame.x);
        let tibial_y = tibia_pose.transform_vector(&self.tibia.frame.y);
        let tibial_z = tibia_pose.transform_vector(&self.tibia.frame.z);

        let varus_valgus_deg =
            projected_signed_angle(&femoral_axis, &tibial_y, &tibial_z, &tibial_x);
        let flexion_deg = projected_signed_angle(&femoral_axis, &tibial_x, &tibial_z, &tibial_y);

        let world_plane = transform_plane(&self.resection_plane, &tibia_pose);
        let medial_gap_mm =
            world_plane.signed_distance(&femur_pose.transform_point(&self.condyles.medial));
        let lateral_gap_mm =
            world_plane.signed_distance(&femur_pose.transform_point(&self.condyles.lateral));

        trace!(
            varus_valgus_deg,
            flexion_deg,
            medial_gap_mm,
            lateral_gap_mm,
            "alignment sample"
        );

        Ok(AlignmentSample {
            timestamp_ms,
            varus_valgus_deg,
            flexion_deg,
            medial_gap_mm,
            lateral_gap_mm,
        })
    }
}

/// Angle, in degrees, between `axis` projected onto the plane with
/// `plane_normal` and the `reference` direction, signed by `sign_reference`.
/// Returns 0 when the projection collapses.
fn projected_signed_angle(
    axis: &Vector3<f64>,
    plane_normal: &Vector3<f64>,
    reference: &Vector3<f64>,
    sign_reference: &Vector3<f64>,
) -> f64 {
    let projected = axis - plane_normal * axis.dot(plane_normal);
    let norm = projected.norm();
    if norm < PROJECTION_EPSILON {
        return 0.0;
    }
    let unit = projected / norm;
    let angle = unit.dot(reference).clamp(-1.0, 1.0).acos();
    let signed = if unit.dot(sign_reference) >= 0.0 {
        angle
    } else {
        -angle
    };
    signed.to_degrees()
}

/// Maps a local-space plane through a rigid transform.
fn transform_plane(plane: &Plane, pose: &RigidTransform) -> Plane {
    let rotated = pose.transform_vector(&plane.normal);
    // A rigid rotation preserves the unit norm; re-unitizing only strips
    // floating-point drift.
    debug_assert!((rotated.norm() - 1.0).abs() < 1e-9);
    Plane {
        point: pose.transform_point(&plane.point),
        normal: Unit::new_normalize(rotated),
    }
}
