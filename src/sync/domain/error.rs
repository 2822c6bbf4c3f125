//! Validation errors for synchronizer settings.

use thiserror::Error;

/// Errors raised while validating synchronizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncDomainError {
    /// No action was configured as start-type.
    #[error("register event list must not be empty")]
    EmptyRegisterActions,

    /// No action was configured as stop-type.
    #[error("deregister event list must not be empty")]
    EmptyDeregisterActions,

    /// An action was configured as both start-type and stop-type.
    #[error("event action '{0}' cannot be both a register and a deregister event")]
    OverlappingAction(String),

    /// The deregistration grace period was zero.
    #[error("deregister delay must be greater than zero")]
    ZeroDeregisterDelay,
}
