//! Registration-to-navigation phase hand-off.
//!
//! Registration is the only writer of the anatomical frames and the bone
//! mesh; navigation only reads them. The hand-off is publish-then-read:
//! [`RegistrationPhase::publish`] consumes the writer by value and returns
//! an immutable [`NavigationState`], so no code path can mutate shared
//! state while a reader exists.

use knee_frames::AnatomicalFrame;
use knee_types::BoneMesh;
use tracing::info;

use crate::error::{AlignError, AlignResult};

/// Mutable registration-phase state. Dropped on publish.
#[derive(Debug, Default)]
pub struct RegistrationPhase {
    femur_frame: Option<AnatomicalFrame>,
    tibia_frame: Option<AnatomicalFrame>,
    bone_mesh: Option<BoneMesh>,
}

/// Read-only state available to the navigation phase.
#[derive(Debug, Clone)]
pub struct NavigationState {
    femur_frame: AnatomicalFrame,
    tibia_frame: AnatomicalFrame,
    bone_mesh: BoneMesh,
}

impl RegistrationPhase {
    /// Starts an empty registration phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the femoral anatomical frame.
    pub fn set_femur_frame(&mut self, frame: AnatomicalFrame) {
        self.femur_frame = Some(frame);
    }

    /// Records the tibial anatomical frame.
    pub fn set_tibia_frame(&mut self, frame: AnatomicalFrame) {
        self.tibia_frame = Some(frame);
    }

    /// Records the fitted bone mesh.
    pub fn set_bone_mesh(&mut self, mesh: BoneMesh) {
        self.bone_mesh = Some(mesh);
    }

    /// Publishes the registration result, consuming the writer.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::IncompleteRegistration`] naming the first
    /// missing piece of state; the caller stays in the registration phase.
    pub fn publish(self) -> AlignResult<NavigationState> {
        let femur_frame = self
            .femur_frame
            .ok_or(AlignError::IncompleteRegistration {
                missing: "femur frame",
            })?;
        let tibia_frame = self
            .tibia_frame
            .ok_or(AlignError::IncompleteRegistration {
                missing: "tibia frame",
            })?;
        let bone_mesh = self.bone_mesh.ok_or(AlignError::IncompleteRegistration {
            missing: "bone mesh",
        })?;

        info!(
            vertices = bone_mesh.vertex_count(),
            "registration published; navigation may start"
        );
        Ok(NavigationState {
            femur_frame,
            tibia_frame,
            bone_mesh,
        })
    }
}

impl NavigationState {
    /// The femoral anatomical frame.
    #[must_use]
    pub const fn femur_frame(&self) -> &AnatomicalFrame {
        &self.femur_frame
    }

    /// The tibial anatomical frame.
    #[must_use]
    pub const fn tibia_frame(&self) -> &AnatomicalFrame {
        &self.tibia_frame
    }

    /// The fitted bone mesh.
    #[must_use]
    pub const fn bone_mesh(&self) -> &BoneMesh {
        &self.bone_mesh
    }
}
