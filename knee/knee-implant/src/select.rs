//! Exhaustive implant size selection.
//!
//! Every candidate size is evaluated against the bone surface; among the
//! feasible sizes the one with the largest total clearance wins, so a
//! barely-fitting size never shadows a better one earlier in the list.
//! Infeasibility is not an error: the documented fallback (index 0, the
//! smallest size) is returned with `feasible = false` so the workflow can
//! warn the operator.

use knee_frames::AnatomicalFrame;
use knee_types::BoneMesh;
use tracing::{debug, warn};

use crate::sdf::SignedSurface;
use crate::template::ImplantTemplate;

/// Candidate index returned when no size passes the containment test.
pub const FALLBACK_INDEX: usize = 0;

/// Outcome of a size selection. Always a valid candidate index.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index into the candidate list.
    pub index: usize,
    /// Size label of the selected candidate.
    pub size_label: String,
    /// Whether the selected candidate passed the containment test.
    pub feasible: bool,
    /// Summed pair clearance of the selected candidate, millimeters.
    pub total_clearance: f64,
}

/// Evaluates one candidate: (feasible, total clearance).
///
/// A pair contributes its summed signed distance; the candidate is feasible
/// when no pair sum is negative (neither check-point pair is net-embedded
/// in bone).
fn evaluate(template: &ImplantTemplate, surface: &SignedSurface<'_>, frame: &AnatomicalFrame) -> (bool, f64) {
    let to_world = frame.to_world();
    let mut feasible = true;
    let mut total = 0.0;
    for pair in &template.check_pairs {
        let anterior = surface.signed_distance(to_world.transform_point(&pair.anterior));
        let posterior = surface.signed_distance(to_world.transform_point(&pair.posterior));
        let sum = anterior + posterior;
        if sum < 0.0 {
            feasible = false;
        }
        total += sum;
    }
    (feasible, total)
}

/// Selects an implant size for the bone surface.
///
/// Check-points are anatomical-frame coordinates; `frame` maps them into
/// the mesh's world space. Returns the feasible candidate with maximum
/// total clearance, or the fallback when none is feasible or the surface
/// is unusable. Never fails.
#[must_use]
pub fn select_implant(
    candidates: &[ImplantTemplate],
    bone: &BoneMesh,
    frame: &AnatomicalFrame,
) -> Selection {
    let Some(first) = candidates.first() else {
        warn!("implant selection called with no candidates");
        return Selection {
            index: FALLBACK_INDEX,
            size_label: String::new(),
            feasible: false,
            total_clearance: 0.0,
        };
    };

    let fallback = |clearance: f64| Selection {
        index: FALLBACK_INDEX,
        size_label: first.size_label.clone(),
        feasible: false,
        total_clearance: clearance,
    };

    let Some(surface) = SignedSurface::new(bone) else {
        warn!("bone surface has no faces; returning fallback implant size");
        return fallback(0.0);
    };

    let mut best: Option<Selection> = None;
    let mut fallback_clearance = 0.0;
    for (index, candidate) in candidates.iter().enumerate() {
        let (feasible, total_clearance) = evaluate(candidate, &surface, frame);
        debug!(
            index,
            size = %candidate.size_label,
            feasible,
            total_clearance,
            "evaluated implant candidate"
        );
        if index == FALLBACK_INDEX {
            fallback_clearance = total_clearance;
        }
        if feasible && best.as_ref().map_or(true, |b| total_clearance > b.total_clearance) {
            best = Some(Selection {
                index,
                size_label: candidate.size_label.clone(),
                feasible: true,
                total_clearance,
            });
        }
    }

    best.unwrap_or_else(|| {
        warn!("no implant candidate is feasible; returning fallback size");
        fallback(fallback_clearance)
    })
}
