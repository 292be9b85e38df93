//! # Engine Error Types
//!
//! Errors that can surface from the ECS core.
//!
//! Most "failures" in the core are ordinary return values, not errors:
//! entity exhaustion yields [`Entity::NULL`](crate::Entity::NULL), a redundant
//! attach yields `None`, a missing detach yields `false`. The variants below
//! cover the cases that must abort the current operation and reach the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Error type returned by event listeners.
///
/// Listeners are user code, so any error type is accepted.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the ECS core.
#[derive(Error, Debug)]
pub enum EcsError {
    /// A listener failed while an event was being dispatched.
    ///
    /// Listeners registered after the failing one did not see the event.
    #[error("listener for {event} failed: {source}")]
    Listener {
        /// Type name of the event being dispatched.
        event: &'static str,
        /// The error returned by the listener.
        #[source]
        source: ListenerError,
    },

    /// A single drain executed more actions than the configured cap.
    ///
    /// Actions that were not executed remain queued.
    #[error("action drain exceeded its cap of {limit} actions")]
    DrainLimitExceeded {
        /// The configured cap.
        limit: usize,
    },

    /// A system reported a failure of its own.
    #[error("system {system} failed: {reason}")]
    System {
        /// Name of the failing system.
        system: String,
        /// Human readable reason.
        reason: String,
    },

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    ConfigIo {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl EcsError {
    /// Wraps a listener failure for the given event type.
    pub(crate) fn listener<E: 'static>(source: ListenerError) -> Self {
        Self::Listener {
            event: std::any::type_name::<E>(),
            source,
        }
    }
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
