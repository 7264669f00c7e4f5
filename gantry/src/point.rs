use crate::DuplicatePauseError;
use crate::RunResult;
use crate::controller::EntryPointKey;
use crate::controller::gate::GlobalGate;
use crate::gauge::ActivityGauge;
use gantry_sync::ActivityListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// The local admission gate of one entry point: decides, in O(1)
/// non-blocking work, whether one more request may start, and tracks how
/// many are in flight.
///
/// A control point is identified by its `(deployment, entry_point)` pair and
/// is shared: multiple installers of the same identity receive the same
/// instance from the [registry](crate::RequestController). Callers on the
/// request path must cache their `Arc<ControlPoint>` (obtained once, at
/// install time) rather than re-resolving it per request.
///
/// ## Admission
///
/// [`begin_request`](ControlPoint::begin_request) composes two layers: the
/// local paused flag and counter, and the process-wide gate of the owning
/// [`RequestController`](crate::RequestController). Either layer may reject,
/// and both must admit. A successful admission obliges the caller to invoke
/// [`request_complete`](ControlPoint::request_complete) exactly once, on
/// every completion path.
///
/// ## Draining
///
/// [`pause`](ControlPoint::pause) stops new admissions and arms an
/// [`ActivityListener`] that fires `finished` exactly once, the moment the
/// active count reaches zero. In-flight requests admitted before the pause
/// are always honored: draining is cooperative, never preemptive.
/// [`resume`](ControlPoint::resume) re-opens admission and, if the drain had
/// not yet resolved, fires `cancelled` instead.
pub struct ControlPoint {
    key: EntryPointKey,
    gauge: ActivityGauge,
    holders: AtomicUsize,
    global: Arc<GlobalGate>,
}

impl ControlPoint {
    /// Internal constructor; control points are created only by the
    /// registry, which also owns their holder accounting.
    pub(crate) fn new(key: EntryPointKey, global: Arc<GlobalGate>) -> Self {
        Self {
            key,
            gauge: ActivityGauge::new(),
            holders: AtomicUsize::new(0),
            global,
        }
    }

    /// Attempts to admit one more request for this entry point.
    ///
    /// Rejects immediately if this control point is paused. Otherwise the
    /// local counter is incremented and the global gate is consulted; if the
    /// global gate rejects, the local increment is rolled back exactly and
    /// the request is rejected.
    ///
    /// On [`RunResult::Run`] the caller **must** later call
    /// [`request_complete`](ControlPoint::request_complete) exactly once. On
    /// [`RunResult::Rejected`] the caller must not: no count was retained.
    pub fn begin_request(&self) -> RunResult {
        if self.gauge.is_paused() {
            return RunResult::Rejected;
        }

        self.gauge.increment();

        if self.global.admit().is_rejected() {
            // Roll back through the same zero-transition logic as a regular
            // completion, so a pause that raced with this admission cannot
            // be left waiting on the transient increment
            self.gauge.decrement();
            return RunResult::Rejected;
        }

        RunResult::Run
    }

    /// Reports the completion of a previously
    /// [admitted](ControlPoint::begin_request) request, releasing both the
    /// local and the global slot.
    ///
    /// Must be called exactly once per admitted request. If this completion
    /// brings a paused control point to zero active requests, the pending
    /// drain listener fires `finished` inline on this thread.
    pub fn request_complete(&self) {
        self.gauge.decrement();
        self.global.release();
    }

    /// Stops admitting new requests and arms the given `listener` to fire
    /// `finished` exactly once when the active count reaches zero.
    ///
    /// If no requests are in flight, the listener fires synchronously within
    /// this call. Exactly one of {a concurrent completion reaching zero,
    /// this call's own zero check} fires it: never both, never neither.
    ///
    /// Pausing an already-paused control point is a caller error: it returns
    /// [`DuplicatePauseError`] with no state change, and the supplied
    /// listener is dropped unfired.
    pub fn pause(&self, listener: Arc<dyn ActivityListener>) -> Result<(), DuplicatePauseError> {
        if !self.gauge.pause(listener) {
            return Err(DuplicatePauseError::EntryPoint {
                deployment: self.key.deployment.clone(),
                entry_point: self.key.entry_point.clone(),
            });
        }

        info!(
            deployment = self.key.deployment.as_ref(),
            entry_point = self.key.entry_point.as_ref(),
            "Pausing entry point",
        );

        Ok(())
    }

    /// Re-opens admission. If a drain listener was still pending, it fires
    /// `cancelled` (and its `finished` will then never fire).
    pub fn resume(&self) {
        self.gauge.resume();

        info!(
            deployment = self.key.deployment.as_ref(),
            entry_point = self.key.entry_point.as_ref(),
            "Resuming entry point",
        );
    }

    /// Reports whether this control point is currently paused.
    pub fn is_paused(&self) -> bool {
        self.gauge.is_paused()
    }

    /// Reports the number of requests currently in flight for this entry
    /// point.
    pub fn active_requests(&self) -> usize {
        self.gauge.active()
    }

    /// Reports the deployment that scopes this entry point.
    pub fn deployment(&self) -> &str {
        &self.key.deployment
    }

    /// Reports the name of this entry point within its deployment.
    pub fn entry_point(&self) -> &str {
        &self.key.entry_point
    }

    /// Internal accessor for the registry key.
    pub(crate) fn key(&self) -> &EntryPointKey {
        &self.key
    }

    /// Counts one more independent holder of this control point. Called only
    /// by the registry, under the registry lock. Returns the new count.
    pub(crate) fn add_holder(&self) -> usize {
        self.holders.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Counts one independent holder of this control point as gone. Called
    /// only by the registry, under the registry lock. Returns the new count.
    pub(crate) fn remove_holder(&self) -> usize {
        let previous = self.holders.fetch_sub(1, Ordering::Relaxed);

        debug_assert!(previous > 0, "control point removed more often than installed");

        previous - 1
    }
}
