//! Sample subscriptions with deterministic teardown.
//!
//! Consumers (display, telemetry) register a callback and hold the
//! returned handle. Unsubscribing with the handle removes the callback
//! immediately; a dropped handle without unsubscribe keeps the
//! subscription alive, so teardown is always an explicit act at a known
//! point in the workflow, never a side effect of garbage order.

use tracing::debug;

use crate::sample::AlignmentSample;

/// Handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle(u64);

type Callback = Box<dyn FnMut(&AlignmentSample)>;

/// Dispatches alignment samples to registered consumers in subscription
/// order.
#[derive(Default)]
pub struct SampleBus {
    subscribers: Vec<(SubscriptionHandle, Callback)>,
    next_id: u64,
}

impl std::fmt::Debug for SampleBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl SampleBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a consumer; samples arrive in subscription order.
    pub fn subscribe(&mut self, callback: impl FnMut(&AlignmentSample) + 'static) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_id);
        self.next_id += 1;
        self.subscribers.push((handle, Box::new(callback)));
        debug!(handle = handle.0, "sample consumer subscribed");
        handle
    }

    /// Removes a subscription. Returns `false` if the handle was already
    /// removed; double teardown is harmless.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(h, _)| *h != handle);
        let removed = self.subscribers.len() != before;
        if removed {
            debug!(handle = handle.0, "sample consumer unsubscribed");
        }
        removed
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers one sample to every live subscriber.
    pub fn publish(&mut self, sample: &AlignmentSample) {
        for (_, callback) in &mut self.subscribers {
            callback(sample);
        }
    }
}
