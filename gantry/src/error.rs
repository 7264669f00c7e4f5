use std::sync::Arc;
use thiserror::Error;

/// Raised when a pause is requested on a gate that is already paused.
///
/// Draining is driven by an orchestrator that is expected to pause each
/// scope at most once before resuming it; a duplicate pause is a caller
/// error, not a state transition, and leaves the gate untouched. In
/// particular, the listener supplied with the duplicate request is dropped
/// without ever firing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DuplicatePauseError {
    /// An entry point was asked to pause while already paused.
    #[error("entry point '{entry_point}' of deployment '{deployment}' is already paused")]
    EntryPoint {
        /// The deployment that scopes the entry point.
        deployment: Arc<str>,

        /// The name of the entry point within its deployment.
        entry_point: Arc<str>,
    },

    /// The global request gate was asked to pause while already paused.
    #[error("the global request gate is already paused")]
    Global,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn entry_point_message_names_the_scope() {
        // Given
        let error = DuplicatePauseError::EntryPoint {
            deployment: Arc::from("shop"),
            entry_point: Arc::from("checkout"),
        };

        // Then
        assert_eq!(
            error.to_string(),
            "entry point 'checkout' of deployment 'shop' is already paused",
        );
    }

    #[test]
    fn global_message() {
        assert_eq!(
            DuplicatePauseError::Global.to_string(),
            "the global request gate is already paused",
        );
    }
}
