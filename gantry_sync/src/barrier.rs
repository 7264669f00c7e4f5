use crate::ActivityListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// An [`ActivityListener`] that fans several independent drains into one.
///
/// The barrier wraps a `downstream` listener together with a remaining count.
/// Each upstream [`finished`](ActivityListener::finished) call decrements the
/// count; only the call that brings it to zero forwards `finished` to the
/// downstream listener.
///
/// Any upstream [`cancelled`](ActivityListener::cancelled) call forwards
/// downstream immediately and marks the barrier resolved: cancellation wins a
/// race against completion, and a later `finished` from a different upstream
/// becomes a no-op. The downstream listener is thus notified at most once,
/// preserving the exactly-once contract of [`ActivityListener`].
///
/// ## Example
///
/// A typical use is suspending both an entry point and the global gate, and
/// acting only once **both** drains have run their course:
///
/// ```rust
/// use gantry_sync::{ActivityListener, CountingBarrier, DrainLatch};
/// use std::sync::Arc;
///
/// let latch = DrainLatch::new();
/// let gate = latch.gate();
///
/// let barrier = Arc::new(CountingBarrier::new(2, Arc::new(latch)));
///
/// // First drain completes: nothing is forwarded yet
/// barrier.finished();
/// assert!(!gate.is_resolved());
///
/// // Second drain completes: the downstream latch resolves
/// barrier.finished();
/// assert!(gate.is_resolved());
/// ```
pub struct CountingBarrier {
    remaining: AtomicUsize,
    resolved: AtomicBool,
    downstream: Arc<dyn ActivityListener>,
}

impl CountingBarrier {
    /// Creates a barrier that forwards [`finished`](ActivityListener::finished)
    /// to the `downstream` listener only after `count` upstream completions
    /// have each reported in.
    ///
    /// The `count` must be at least 1.
    pub fn new(count: usize, downstream: Arc<dyn ActivityListener>) -> Self {
        debug_assert!(count >= 1, "a counting barrier must await at least one completion");

        Self {
            remaining: AtomicUsize::new(count),
            resolved: AtomicBool::new(false),
            downstream,
        }
    }

    /// Reports whether this barrier has already notified its downstream
    /// listener (in either direction).
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }
}

impl ActivityListener for CountingBarrier {
    /// Counts down one upstream completion, forwarding downstream on the
    /// zero transition unless the barrier was already resolved by a
    /// cancellation.
    fn finished(&self) {
        // Only the decrement that reaches zero may attempt the forwarding
        if self.remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
            return;
        }

        // Claim the single resolution slot
        if !self.resolved.swap(true, Ordering::AcqRel) {
            self.downstream.finished();
        }
    }

    /// Forwards a cancellation downstream immediately, unless some other
    /// upstream has already resolved the barrier.
    fn cancelled(&self) {
        if !self.resolved.swap(true, Ordering::AcqRel) {
            self.downstream.cancelled();
        }
    }
}
