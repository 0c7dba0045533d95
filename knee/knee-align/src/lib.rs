//! Real-time alignment measurement for navigated knee surgery.
//!
//! Tracked poses live in a [`TransformArena`] keyed by stable ids; the
//! [`AlignmentEngine`] composes explicit id chains per throttled update
//! and converts the resulting world poses into varus/valgus, flexion, and
//! compartment gaps ([`AlignmentSample`]). Samples fan out through a
//! [`SampleBus`] with explicit subscription teardown, and the
//! registration-to-navigation hand-off is enforced by
//! [`RegistrationPhase::publish`].

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod arena;
mod engine;
mod error;
mod phase;
mod sample;
mod subscription;

pub use arena::{TransformArena, TransformId};
pub use engine::{
    AlignmentEngine, BodyHandles, CondylarPoints, EngineConfig, DEFAULT_THROTTLE,
};
pub use error::{AlignError, AlignResult};
pub use phase::{NavigationState, RegistrationPhase};
pub use sample::AlignmentSample;
pub use subscription::{SampleBus, SubscriptionHandle};
