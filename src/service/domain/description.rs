//! Canonical service description derived from a container.

use super::{ServiceDomainError, ServiceId};
use serde::{Deserialize, Serialize};

/// What the registry should hold for one container instance.
///
/// Descriptions are derived fresh from the container's current inspection
/// state whenever needed and are never cached or mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescription {
    service_id: ServiceId,
    service_name: String,
    service_port: u16,
    traefik_labels: Vec<String>,
    connect: bool,
}

impl ServiceDescription {
    /// Creates a validated description.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceDomainError::EmptyServiceName`] for an empty name or
    /// [`ServiceDomainError::ZeroPort`] when the port is zero.
    pub fn new(
        service_id: ServiceId,
        service_name: impl Into<String>,
        service_port: u16,
        traefik_labels: Vec<String>,
        connect: bool,
    ) -> Result<Self, ServiceDomainError> {
        let name = service_name.into();
        if name.is_empty() {
            return Err(ServiceDomainError::EmptyServiceName);
        }
        if service_port == 0 {
            return Err(ServiceDomainError::ZeroPort);
        }
        Ok(Self {
            service_id,
            service_name: name,
            service_port,
            traefik_labels,
            connect,
        })
    }

    /// Returns the registry key of this instance.
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    /// Returns the logical service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the port the registry routes to.
    #[must_use]
    pub const fn service_port(&self) -> u16 {
        self.service_port
    }

    /// Returns the prefixed labels as `key=value` tags, in source order.
    #[must_use]
    pub fn traefik_labels(&self) -> &[String] {
        &self.traefik_labels
    }

    /// Returns whether a Connect sidecar should be provisioned.
    #[must_use]
    pub const fn connect(&self) -> bool {
        self.connect
    }
}
