use self::gate::GlobalGate;
use crate::ControllerConfig;
use crate::ControlPoint;
use crate::DuplicatePauseError;
use gantry_sync::ActivityListener;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) mod gate;

/// The process-wide request controller: the global admission gate plus the
/// authoritative registry of [`ControlPoint`]s.
///
/// The controller is an explicitly constructed, explicitly owned service
/// (typically one `Arc<RequestController>` per process, handed to whatever
/// wires up entry points) rather than an ambient global.
///
/// ## Two-level admission
///
/// Every [`ControlPoint`] created by this controller shares its global gate:
/// an admission must pass both the local (per-entry-point) and the global
/// check, and either layer may reject. Pausing the controller drains the
/// process-wide count but does **not** pause individual control points;
/// each can still be paused and resumed independently.
///
/// ## Registry lifecycle
///
/// Entry points are shared by identity: repeated
/// [`entry_point`](RequestController::entry_point) calls for the same
/// `(deployment, entry_point)` pair return the same control point with its
/// holder count incremented, and
/// [`remove_entry_point`](RequestController::remove_entry_point) drops the
/// registry entry once the last holder releases it. Install and removal are
/// rare, deployment-time operations and are serialized under one lock; the
/// per-request path never touches that lock.
pub struct RequestController {
    gate: Arc<GlobalGate>,
    entry_points: Mutex<HashMap<EntryPointKey, Arc<ControlPoint>>>,
}

impl RequestController {
    /// Creates a controller with an empty registry and the given
    /// configuration.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            gate: Arc::new(GlobalGate::new(config.max_concurrent_requests)),
            entry_points: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves the shared [`ControlPoint`] for the given identity, creating
    /// it on first install, and counts the caller as one more holder.
    ///
    /// Every call must eventually be balanced by one
    /// [`remove_entry_point`](RequestController::remove_entry_point) call
    /// with the returned instance. Safe to call concurrently with removal.
    pub fn entry_point(&self, deployment: &str, entry_point: &str) -> Arc<ControlPoint> {
        let key = EntryPointKey::new(deployment, entry_point);

        let mut entry_points = self.entry_points.lock();

        let point = entry_points.entry(key.clone()).or_insert_with(|| {
            debug!(deployment, entry_point, "Registering entry point");

            Arc::new(ControlPoint::new(key, Arc::clone(&self.gate)))
        });

        point.add_holder();

        Arc::clone(point)
    }

    /// Releases one holder of the given control point, removing the registry
    /// entry once no holders remain.
    ///
    /// Removal is orthogonal to draining: a removed-but-still-draining
    /// control point keeps honoring its in-flight completions and simply
    /// becomes unreachable once all holders release it.
    pub fn remove_entry_point(&self, point: &Arc<ControlPoint>) {
        let mut entry_points = self.entry_points.lock();

        if point.remove_holder() == 0 {
            debug!(
                deployment = point.deployment(),
                entry_point = point.entry_point(),
                "Removing entry point",
            );

            entry_points.remove(point.key());
        }
    }

    /// Stops admitting new requests process-wide and arms the given
    /// `listener` to fire `finished` exactly once when the global active
    /// count reaches zero (synchronously within this call if it already is).
    ///
    /// Individual control points are **not** paused; new requests are still
    /// rejected at the global layer regardless.
    pub fn pause(&self, listener: Arc<dyn ActivityListener>) -> Result<(), DuplicatePauseError> {
        if !self.gate.pause(listener) {
            return Err(DuplicatePauseError::Global);
        }

        info!("Pausing global request gate");

        Ok(())
    }

    /// Re-opens the global gate. If a global drain listener was still
    /// pending, it fires `cancelled` (and its `finished` will then never
    /// fire).
    pub fn resume(&self) {
        self.gate.resume();

        info!("Resuming global request gate");
    }

    /// Reports whether the global gate is currently paused.
    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// Reports the process-wide number of requests currently in flight.
    pub fn active_requests(&self) -> usize {
        self.gate.active()
    }

    /// Reports the configured process-wide concurrency ceiling (`0` meaning
    /// unlimited).
    pub fn max_concurrent_requests(&self) -> usize {
        self.gate.max_concurrent()
    }

    /// Reports the number of entry points currently registered.
    pub fn entry_point_count(&self) -> usize {
        self.entry_points.lock().len()
    }
}

/// The registry key: the identity of one logical request source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EntryPointKey {
    pub(crate) deployment: Arc<str>,
    pub(crate) entry_point: Arc<str>,
}

impl EntryPointKey {
    fn new(deployment: &str, entry_point: &str) -> Self {
        Self {
            deployment: Arc::from(deployment),
            entry_point: Arc::from(entry_point),
        }
    }
}
