use gantry_sync::ActivityListener;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// The shared state machine behind every admission gate: an active-request
/// count, a paused flag, and the pending-listener register that implements
/// the exactly-once drain notification.
///
/// Both the per-entry-point gate ([`ControlPoint`](crate::ControlPoint)) and
/// the global gate are thin wrappers around this gauge. The count and the
/// flag are touched only with atomic read-modify-write operations; the
/// listener register is a mutex-guarded slot, but it is claimed only on the
/// zero transition while paused, never on the steady-state admit/complete
/// path.
pub(crate) struct ActivityGauge {
    active: AtomicUsize,
    paused: AtomicBool,
    pending_listener: Mutex<Option<Arc<dyn ActivityListener>>>,
}

impl ActivityGauge {
    /// Creates an idle, unpaused gauge.
    pub(crate) fn new() -> Self {
        Self {
            active: AtomicUsize::new(0),
            paused: AtomicBool::new(false),
            pending_listener: Mutex::new(None),
        }
    }

    /// Reports whether this gauge is currently paused.
    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Reports the current active count.
    pub(crate) fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Unconditionally counts one more active request.
    pub(crate) fn increment(&self) {
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    /// Counts one more active request only while the count stays below the
    /// given `ceiling`. The check and the increment form a single atomic
    /// step, so the ceiling is never overshot even under contention.
    pub(crate) fn increment_below(&self, ceiling: usize) -> bool {
        let mut current = self.active.load(Ordering::Acquire);

        loop {
            if current >= ceiling {
                return false;
            }

            match self.active.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Counts one active request as gone. If this was the last one and the
    /// gauge is paused, claims and fires the pending listener.
    ///
    /// Only the caller that performs the decrement to zero attempts the
    /// claim, and the claim itself is an atomic take, so a racing
    /// [`pause`](ActivityGauge::pause)-time zero check can never double-fire.
    pub(crate) fn decrement(&self) {
        // SeqCst pairs with the flag-write/count-read in `pause`: the two
        // checks must fall into one total order, or a completer reading a
        // stale flag and a pauser reading a stale count could each skip the
        // claim, leaving the listener armed forever
        let previous = self.active.fetch_sub(1, Ordering::SeqCst);

        debug_assert!(
            previous > 0,
            "completion reported without a matching admission",
        );

        if previous == 1 && self.paused.load(Ordering::SeqCst) {
            self.fire_finished();
        }
    }

    /// Pauses this gauge, arming the given listener to fire once the active
    /// count reaches zero. Returns `false` (with no state change, dropping
    /// the listener unfired) if the gauge was already paused.
    pub(crate) fn pause(&self, listener: Arc<dyn ActivityListener>) -> bool {
        // SeqCst pairs with the count-write/flag-read in `decrement`
        if self.paused.swap(true, Ordering::SeqCst) {
            return false;
        }

        // Arm the listener
        *self.pending_listener.lock() = Some(listener);

        // The last in-flight request may have completed between the flag
        // write and the listener store; cover that window here. The atomic
        // take inside guarantees that exactly one of {this check, a
        // concurrent decrement reaching zero} fires.
        if self.active.load(Ordering::SeqCst) == 0 {
            self.fire_finished();
        }

        true
    }

    /// Lifts the pause. If a listener is still armed (the drain had not yet
    /// reached zero, or nobody had claimed it), fires its cancellation
    /// instead; `finished` will then never fire for it.
    pub(crate) fn resume(&self) {
        self.paused.store(false, Ordering::Release);

        // Claim outside the callback, so a listener may re-enter a gate
        let claimed = self.pending_listener.lock().take();

        if let Some(listener) = claimed {
            listener.cancelled();
        }
    }

    /// Claims the pending listener, if any, and fires its completion.
    fn fire_finished(&self) {
        let claimed = self.pending_listener.lock().take();

        if let Some(listener) = claimed {
            listener.finished();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        finished: AtomicUsize,
        cancelled: AtomicUsize,
    }

    impl Recorder {
        fn counts(&self) -> (usize, usize) {
            (
                self.finished.load(Ordering::SeqCst),
                self.cancelled.load(Ordering::SeqCst),
            )
        }
    }

    impl ActivityListener for Recorder {
        fn finished(&self) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }

        fn cancelled(&self) {
            self.cancelled.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn count_balances_out() {
        // Given
        let gauge = ActivityGauge::new();

        // When
        gauge.increment();
        gauge.increment();
        gauge.decrement();
        gauge.increment();
        gauge.decrement();
        gauge.decrement();

        // Then
        assert_eq!(gauge.active(), 0);
    }

    #[test]
    fn pause_on_idle_fires_synchronously() {
        // Given
        let gauge = ActivityGauge::new();
        let recorder = Arc::new(Recorder::default());

        // When
        assert!(gauge.pause(recorder.clone()));

        // Then
        assert_eq!(recorder.counts(), (1, 0));
        assert!(gauge.is_paused());
    }

    #[test]
    fn pause_fires_on_last_completion() {
        // Given
        let gauge = ActivityGauge::new();
        let recorder = Arc::new(Recorder::default());
        gauge.increment();
        gauge.increment();

        // When
        assert!(gauge.pause(recorder.clone()));

        // Then
        assert_eq!(recorder.counts(), (0, 0));

        // When
        gauge.decrement();
        assert_eq!(recorder.counts(), (0, 0));
        gauge.decrement();

        // Then
        assert_eq!(recorder.counts(), (1, 0));
    }

    #[test]
    fn duplicate_pause_is_rejected_and_drops_listener() {
        // Given
        let gauge = ActivityGauge::new();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        gauge.increment();

        // When
        assert!(gauge.pause(first.clone()));
        assert!(!gauge.pause(second.clone()));
        gauge.decrement();

        // Then
        assert_eq!(first.counts(), (1, 0));
        assert_eq!(second.counts(), (0, 0));
    }

    #[test]
    fn resume_cancels_pending_drain() {
        // Given
        let gauge = ActivityGauge::new();
        let recorder = Arc::new(Recorder::default());
        gauge.increment();
        assert!(gauge.pause(recorder.clone()));

        // When
        gauge.resume();

        // Then
        assert_eq!(recorder.counts(), (0, 1));

        // When: the in-flight request completes after the cancellation
        gauge.decrement();

        // Then: no late `finished`
        assert_eq!(recorder.counts(), (0, 1));
        assert!(!gauge.is_paused());
    }

    #[test]
    fn ceiling_is_never_overshot() {
        // Given
        let gauge = ActivityGauge::new();

        // When
        assert!(gauge.increment_below(2));
        assert!(gauge.increment_below(2));

        // Then
        assert!(!gauge.increment_below(2));
        assert_eq!(gauge.active(), 2);

        // When
        gauge.decrement();

        // Then
        assert!(gauge.increment_below(2));
    }

    #[test]
    fn concurrent_completions_fire_exactly_once() {
        // Given
        let gauge = Arc::new(ActivityGauge::new());
        let recorder = Arc::new(Recorder::default());
        for _ in 0..3 {
            gauge.increment();
        }
        assert!(gauge.pause(recorder.clone()));

        // When: three completions race on different threads
        let handles = (0..3)
            .map(|_| {
                let gauge = gauge.clone();
                std::thread::spawn(move || gauge.decrement())
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }

        // Then
        assert_eq!(recorder.counts(), (1, 0));
        assert_eq!(gauge.active(), 0);
    }

    #[test]
    fn concurrent_bounded_admissions_respect_ceiling() {
        // Given
        let gauge = Arc::new(ActivityGauge::new());
        let admitted = Arc::new(AtomicUsize::new(0));

        // When: many threads contend for a small ceiling
        let handles = (0..16)
            .map(|_| {
                let gauge = gauge.clone();
                let admitted = admitted.clone();
                std::thread::spawn(move || {
                    if gauge.increment_below(4) {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }

        // Then
        assert_eq!(admitted.load(Ordering::SeqCst), 4);
        assert_eq!(gauge.active(), 4);
    }
}
