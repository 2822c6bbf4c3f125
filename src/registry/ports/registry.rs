//! Registry port for publishing and withdrawing service entries.

use crate::registry::domain::RegisteredServiceSet;
use crate::service::domain::{ServiceDescription, ServiceId};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for service registry operations.
pub type ServiceRegistryResult<T> = Result<T, ServiceRegistryError>;

/// Contract over the external service registry.
///
/// Every operation is idempotent from the caller's perspective and performs
/// no retries; callers decide whether a failure is logged or escalated.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Upserts the entry for a service description.
    ///
    /// Connect-enabled descriptions also provision a sidecar registration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceRegistryError`] on transport failure or any
    /// non-success response.
    async fn register(&self, service: &ServiceDescription) -> ServiceRegistryResult<()>;

    /// Removes an entry by identifier. An entry that is already gone counts
    /// as removed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceRegistryError`] on transport failure or any
    /// non-success response other than "not found".
    async fn deregister(&self, service_id: &ServiceId) -> ServiceRegistryResult<()>;

    /// Returns every entry currently held by the registry.
    async fn list_registered(&self) -> ServiceRegistryResult<RegisteredServiceSet>;
}

/// Registry operation named in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryOperation {
    /// Service registration.
    Register,
    /// Service deregistration.
    Deregister,
    /// Listing registered services.
    List,
}

impl RegistryOperation {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Deregister => "deregister",
            Self::List => "list",
        }
    }
}

impl fmt::Display for RegistryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by service registry adapters.
#[derive(Debug, Clone, Error)]
pub enum ServiceRegistryError {
    /// The registry answered with a non-success status.
    #[error("registry rejected {operation}: HTTP {status}: {message}")]
    Rejected {
        /// Operation that was rejected.
        operation: RegistryOperation,
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The configured registry address is unusable.
    #[error("invalid registry address '{address}': {reason}")]
    InvalidAddress {
        /// Address as configured.
        address: String,
        /// Reason string.
        reason: String,
    },

    /// The registry response could not be decoded.
    #[error("invalid registry response for {operation}: {source}")]
    InvalidResponse {
        /// Operation whose response was invalid.
        operation: RegistryOperation,
        /// Decoding failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The request did not complete.
    #[error("registry transport error during {operation}: {source}")]
    Transport {
        /// Operation that failed.
        operation: RegistryOperation,
        /// Transport failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl ServiceRegistryError {
    /// Wraps a response decoding failure.
    pub fn invalid_response(
        operation: RegistryOperation,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidResponse {
            operation,
            source: Arc::new(err),
        }
    }

    /// Wraps a transport failure.
    pub fn transport(
        operation: RegistryOperation,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            operation,
            source: Arc::new(err),
        }
    }
}
