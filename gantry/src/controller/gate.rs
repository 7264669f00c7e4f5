use crate::RunResult;
use crate::gauge::ActivityGauge;
use gantry_sync::ActivityListener;
use std::sync::Arc;

/// The process-wide admission gate: one [`ActivityGauge`] plus the
/// configured concurrency ceiling.
///
/// Shared (via `Arc`) between the [`RequestController`](crate::RequestController)
/// and every [`ControlPoint`](crate::ControlPoint) it creates, so that the
/// per-request path never goes through the registry.
pub(crate) struct GlobalGate {
    gauge: ActivityGauge,
    max_concurrent: usize,
}

impl GlobalGate {
    /// Creates an open gate with the given ceiling (`0` meaning unlimited).
    pub(crate) fn new(max_concurrent: usize) -> Self {
        Self {
            gauge: ActivityGauge::new(),
            max_concurrent,
        }
    }

    /// Attempts to admit one more request process-wide: rejects while
    /// paused, rejects at the ceiling, otherwise counts the request in.
    ///
    /// Callable concurrently from many control points; the ceiling check and
    /// the increment form one atomic step.
    pub(crate) fn admit(&self) -> RunResult {
        if self.gauge.is_paused() {
            return RunResult::Rejected;
        }

        if self.max_concurrent == 0 {
            self.gauge.increment();
            return RunResult::Run;
        }

        if self.gauge.increment_below(self.max_concurrent) {
            RunResult::Run
        } else {
            RunResult::Rejected
        }
    }

    /// Counts one admitted request as complete, resolving a pending global
    /// drain if this was the last one.
    pub(crate) fn release(&self) {
        self.gauge.decrement();
    }

    /// Pauses the gate, arming the listener for the global zero transition.
    /// Returns `false` if the gate was already paused.
    pub(crate) fn pause(&self, listener: Arc<dyn ActivityListener>) -> bool {
        self.gauge.pause(listener)
    }

    /// Re-opens the gate, cancelling any pending drain listener.
    pub(crate) fn resume(&self) {
        self.gauge.resume();
    }

    /// Reports whether the gate is currently paused.
    pub(crate) fn is_paused(&self) -> bool {
        self.gauge.is_paused()
    }

    /// Reports the process-wide number of requests currently in flight.
    pub(crate) fn active(&self) -> usize {
        self.gauge.active()
    }

    /// Reports the configured ceiling (`0` meaning unlimited).
    pub(crate) fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}
