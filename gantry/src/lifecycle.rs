use crate::ControlPoint;
use crate::RequestController;
use std::sync::Arc;

/// The lifecycle adapter between the registry and an external service
/// framework: one installed entry point, released again on drop.
///
/// On [`install`](EntryPointHandle::install), the handle resolves the shared
/// [`ControlPoint`] for the given identity through the controller's
/// registry, and holds it as its provided value for the surrounding
/// framework to consume. Dropping the handle (or calling
/// [`uninstall`](EntryPointHandle::uninstall) explicitly) releases the
/// reference exactly once, removing the registry entry if this was the last
/// holder.
///
/// The handle owns no concurrency logic. Request-path code should clone the
/// [`control_point`](EntryPointHandle::control_point) once and keep it;
/// draining on the point keeps working even after the handle is dropped.
pub struct EntryPointHandle {
    controller: Arc<RequestController>,
    control_point: Option<Arc<ControlPoint>>,
}

impl EntryPointHandle {
    /// Installs the `(deployment, entry_point)` identity into the given
    /// controller's registry, sharing the control point with any other
    /// installers of the same identity.
    pub fn install(
        controller: Arc<RequestController>,
        deployment: &str,
        entry_point: &str,
    ) -> Self {
        let control_point = controller.entry_point(deployment, entry_point);

        Self {
            controller,
            control_point: Some(control_point),
        }
    }

    /// The control point provided by this installation.
    pub fn control_point(&self) -> &Arc<ControlPoint> {
        self.control_point
            .as_ref()
            .expect("the control point is only taken out on drop")
    }

    /// Explicitly releases this installation. Equivalent to dropping the
    /// handle.
    pub fn uninstall(self) {
        drop(self);
    }
}

impl Drop for EntryPointHandle {
    /// Releases this installation's reference to the shared control point.
    fn drop(&mut self) {
        if let Some(control_point) = self.control_point.take() {
            self.controller.remove_entry_point(&control_point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControllerConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn install_and_drop_balance_the_registry() {
        // Given
        let controller = Arc::new(RequestController::new(ControllerConfig::default()));

        // When
        let handle = EntryPointHandle::install(controller.clone(), "app", "login");

        // Then
        assert_eq!(controller.entry_point_count(), 1);

        // When
        drop(handle);

        // Then
        assert_eq!(controller.entry_point_count(), 0);
    }

    #[test]
    fn handles_of_same_identity_share_the_point() {
        // Given
        let controller = Arc::new(RequestController::new(ControllerConfig::default()));
        let handle_a = EntryPointHandle::install(controller.clone(), "app", "login");
        let handle_b = EntryPointHandle::install(controller.clone(), "app", "login");

        // Then
        assert!(Arc::ptr_eq(handle_a.control_point(), handle_b.control_point()));

        // When
        handle_a.uninstall();

        // Then: the other installation is untouched
        assert_eq!(controller.entry_point_count(), 1);
        assert!(handle_b.control_point().begin_request().is_run());
        handle_b.control_point().request_complete();
    }

    #[test]
    fn point_outlives_its_handle() {
        // Given
        let controller = Arc::new(RequestController::new(ControllerConfig::default()));
        let handle = EntryPointHandle::install(controller.clone(), "app", "login");
        let point = handle.control_point().clone();

        // When
        drop(handle);

        // Then: the cached point still admits and completes
        assert!(point.begin_request().is_run());
        point.request_complete();
        assert_eq!(point.active_requests(), 0);
    }
}
