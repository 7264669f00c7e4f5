#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Controller configuration.
mod config;
pub use self::config::ControllerConfig;

/// Admission outcome.
mod result;
pub use self::result::RunResult;

/// Error types.
mod error;
pub use self::error::DuplicatePauseError;

/// Shared counter/pause/listener state machine behind every gate.
mod gauge;

/// Per-entry-point admission gate.
mod point;
pub use self::point::ControlPoint;

/// Process-wide gate and entry-point registry.
mod controller;
pub use self::controller::RequestController;

/// Entry-point lifecycle adapter.
mod lifecycle;
pub use self::lifecycle::EntryPointHandle;
