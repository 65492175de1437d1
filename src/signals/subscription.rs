//! Subscription handles.
//!
//! A [`Subscription`] is an RAII guard: dropping it (or calling
//! [`Subscription::unsubscribe`]) runs its teardown exactly once.
//!
//! [`SubscriptionSlot`] is the crate-internal cell used by operators that
//! may be asked to stop *while their upstream is still subscribing* (a
//! synchronous source can emit `End` before `subscribe()` has returned the
//! handle). Closing an empty slot marks it closed, and a handle that arrives
//! later is dropped on arrival.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Subscription
// =============================================================================

/// Handle to a live subscription. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Create a subscription that runs `teardown` when released.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    /// Combine two subscriptions into one that releases both.
    pub fn and(self, other: Subscription) -> Subscription {
        Subscription::new(move || {
            drop(self);
            drop(other);
        })
    }

    /// Release the subscription now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.teardown.is_some())
            .finish()
    }
}

// =============================================================================
// SubscriptionSlot
// =============================================================================

#[derive(Default)]
struct SlotState {
    subscription: RefCell<Option<Subscription>>,
    closed: Cell<bool>,
}

/// Shared, closable holder for an upstream subscription.
#[derive(Clone, Default)]
pub(crate) struct SubscriptionSlot {
    state: Rc<SlotState>,
}

impl SubscriptionSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store `subscription`, or drop it right away if the slot was closed.
    pub(crate) fn fill(&self, subscription: Subscription) {
        if self.state.closed.get() {
            drop(subscription);
        } else {
            let previous = self.state.subscription.replace(Some(subscription));
            drop(previous);
        }
    }

    /// Close the slot, releasing whatever it holds.
    pub(crate) fn close(&self) {
        self.state.closed.set(true);
        let held = self.state.subscription.borrow_mut().take();
        drop(held);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.closed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_runs_teardown_once() {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let subscription = Subscription::new(move || count_clone.set(count_clone.get() + 1));

        drop(subscription);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_and_releases_both() {
        let count = Rc::new(Cell::new(0));
        let (a, b) = (count.clone(), count.clone());
        let combined = Subscription::new(move || a.set(a.get() + 1))
            .and(Subscription::new(move || b.set(b.get() + 1)));

        combined.unsubscribe();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_slot_drops_late_subscription_after_close() {
        let released = Rc::new(Cell::new(false));
        let released_clone = released.clone();
        let slot = SubscriptionSlot::new();

        slot.close();
        slot.fill(Subscription::new(move || released_clone.set(true)));

        assert!(released.get(), "late handle must be released on arrival");
        assert!(slot.is_closed());
    }
}
