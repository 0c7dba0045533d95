//! Transform arena.
//!
//! Tracked poses live in a flat arena keyed by stable ids. There is no
//! implicit hierarchy: a pose chain is an explicit id list, and
//! [`TransformArena::compose`] evaluates it into a single rigid transform
//! per query. The tracking subsystem is the only writer; the engine reads.

use hashbrown::HashMap;
use knee_types::RigidTransform;

use crate::error::{AlignError, AlignResult};

/// Stable handle to a transform in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformId(u64);

/// Flat storage for the tracked rigid transforms.
#[derive(Debug, Default)]
pub struct TransformArena {
    transforms: HashMap<TransformId, RigidTransform>,
    next_id: u64,
}

impl TransformArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a transform and returns its stable id.
    pub fn insert(&mut self, transform: RigidTransform) -> TransformId {
        let id = TransformId(self.next_id);
        self.next_id += 1;
        self.transforms.insert(id, transform);
        id
    }

    /// Overwrites the transform behind an id.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::UnknownTransform`] if the id was never
    /// inserted.
    pub fn set(&mut self, id: TransformId, transform: RigidTransform) -> AlignResult<()> {
        match self.transforms.get_mut(&id) {
            Some(slot) => {
                *slot = transform;
                Ok(())
            }
            None => Err(AlignError::UnknownTransform(id)),
        }
    }

    /// Reads the transform behind an id.
    #[must_use]
    pub fn get(&self, id: TransformId) -> Option<&RigidTransform> {
        self.transforms.get(&id)
    }

    /// Evaluates a pose chain into one rigid transform.
    ///
    /// Ids are listed root first: `compose(&[a, b])` applies `b` first,
    /// then `a`, mapping leaf-local coordinates into the root frame. The
    /// empty chain composes to the identity. Pure: the arena is not
    /// mutated and equal inputs give equal outputs.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::UnknownTransform`] for any id not in the
    /// arena.
    pub fn compose(&self, chain: &[TransformId]) -> AlignResult<RigidTransform> {
        let mut result = RigidTransform::identity();
        for &id in chain {
            let t = self
                .transforms
                .get(&id)
                .ok_or(AlignError::UnknownTransform(id))?;
            result = result.compose(t);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use knee_types::{Point3, UnitQuaternion, Vector3};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn empty_chain_is_identity() {
        let arena = TransformArena::new();
        let composed = arena.compose(&[]).unwrap();
        assert!(composed.is_identity(1e-12));
    }

    #[test]
    fn chain_applies_leafmost_transform_first() {
        let mut arena = TransformArena::new();
        let root = arena.insert(RigidTransform::from_rotation(
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        ));
        let leaf = arena.insert(RigidTransform::from_translation(Vector3::new(
            1.0, 0.0, 0.0,
        )));

        let composed = arena.compose(&[root, leaf]).unwrap();
        // Translate to (1,0,0), then rotate 90 deg about z: lands on (0,1,0).
        let p = composed.transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn compose_is_pure() {
        let mut arena = TransformArena::new();
        let id = arena.insert(RigidTransform::from_translation(Vector3::new(
            2.0, 3.0, 4.0,
        )));
        let a = arena.compose(&[id, id]).unwrap();
        let b = arena.compose(&[id, id]).unwrap();
        assert_relative_eq!(a.translation, b.translation);
        assert_relative_eq!(a.translation, Vector3::new(4.0, 6.0, 8.0));
    }

    #[test]
    fn set_updates_subsequent_queries() {
        let mut arena = TransformArena::new();
        let id = arena.insert(RigidTransform::identity());
        arena
            .set(id, RigidTransform::from_translation(Vector3::x()))
            .unwrap();
        let composed = arena.compose(&[id]).unwrap();
        assert_relative_eq!(composed.translation, Vector3::x());
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut arena = TransformArena::new();
        let id = arena.insert(RigidTransform::identity());
        assert!(arena.compose(&[id]).is_ok());

        let missing = TransformId(99);
        assert_eq!(
            arena.compose(&[id, missing]),
            Err(AlignError::UnknownTransform(missing))
        );
        assert!(arena.set(missing, RigidTransform::identity()).is_err());
    }
}
