use crate::ActivityListener;
use tokio::select;
use tokio_util::sync::CancellationToken;

/// An [`ActivityListener`] whose resolution can be awaited asynchronously
/// through any number of associated [`DrainGate`]s.
///
/// The drain engine resolves listeners synchronously, inline on whichever
/// thread observes the terminal event. A suspend orchestrator, on the other
/// hand, usually wants to `await` that resolution. The latch bridges the two
/// worlds: hand the latch out as the listener, keep a [gate](DrainLatch::gate)
/// for yourself, and await the [outcome](DrainGate::resolved).
///
/// ## Example
///
/// ```rust
/// use gantry_sync::{ActivityListener, DrainLatch, DrainOutcome};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
///
/// // Make a latch
/// let latch = DrainLatch::new();
///
/// // Derive a gate from it
/// let gate = latch.gate();
///
/// // Hand the latch out to the draining component
/// let listener: Arc<dyn ActivityListener> = Arc::new(latch);
///
/// // The draining component reports completion on some thread
/// listener.finished();
///
/// // Await the resolution
/// assert_eq!(gate.resolved().await, DrainOutcome::Finished);
///
/// # })
/// ```
#[derive(Debug, Default, Clone)]
pub struct DrainLatch {
    finished: CancellationToken,
    cancelled: CancellationToken,
}

/// A cheaply-cloneable handle that resolves when the associated
/// [`DrainLatch`] receives its terminal event.
#[derive(Debug, Clone)]
pub struct DrainGate {
    finished: CancellationToken,
    cancelled: CancellationToken,
}

/// The terminal event observed by a [`DrainLatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// All tracked activity completed while draining.
    Finished,

    /// Draining was called off before all tracked activity completed.
    Cancelled,
}

impl DrainLatch {
    /// Returns a brand new, unresolved [`DrainLatch`].
    pub fn new() -> Self {
        Self {
            finished: CancellationToken::new(),
            cancelled: CancellationToken::new(),
        }
    }

    /// Returns a new [`DrainGate`] handle associated with this latch.
    /// Multiple gates can be created and awaited independently, all linked
    /// to the same single-resolution latch.
    pub fn gate(&self) -> DrainGate {
        DrainGate {
            finished: self.finished.clone(),
            cancelled: self.cancelled.clone(),
        }
    }
}

impl ActivityListener for DrainLatch {
    /// Resolves this latch with [`DrainOutcome::Finished`], notifying all
    /// associated [`DrainGate`]s.
    fn finished(&self) {
        self.finished.cancel();
    }

    /// Resolves this latch with [`DrainOutcome::Cancelled`], notifying all
    /// associated [`DrainGate`]s.
    fn cancelled(&self) {
        self.cancelled.cancel();
    }
}

impl DrainGate {
    /// Waits asynchronously until the associated [`DrainLatch`] receives its
    /// terminal event, then reports the [`DrainOutcome`]. Resolves
    /// immediately if the latch has already been resolved.
    pub async fn resolved(&self) -> DrainOutcome {
        select! {
            biased; // no need to pay for randomized branch checking
            _ = self.finished.cancelled() => DrainOutcome::Finished,
            _ = self.cancelled.cancelled() => DrainOutcome::Cancelled,
        }
    }

    /// Reports whether the associated [`DrainLatch`] has already been
    /// resolved.
    pub fn is_resolved(&self) -> bool {
        self.finished.is_cancelled() || self.cancelled.is_cancelled()
    }

    /// Reports the [`DrainOutcome`] if the associated [`DrainLatch`] has
    /// already been resolved, without waiting.
    pub fn outcome(&self) -> Option<DrainOutcome> {
        if self.finished.is_cancelled() {
            Some(DrainOutcome::Finished)
        } else if self.cancelled.is_cancelled() {
            Some(DrainOutcome::Cancelled)
        } else {
            None
        }
    }
}
