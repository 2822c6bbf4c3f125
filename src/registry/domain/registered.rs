//! Snapshot of services currently held by the registry.

use crate::service::domain::ServiceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registry kind of Connect sidecar proxies.
pub const CONNECT_PROXY_KIND: &str = "connect-proxy";

/// One entry as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredService {
    id: ServiceId,
    service: String,
    tags: Vec<String>,
    port: u16,
    kind: Option<String>,
}

impl RegisteredService {
    /// Creates a registry entry.
    #[must_use]
    pub fn new(id: ServiceId, service: impl Into<String>, tags: Vec<String>, port: u16) -> Self {
        Self {
            id,
            service: service.into(),
            tags,
            port,
            kind: None,
        }
    }

    /// Sets the registry service kind (for example `connect-proxy`).
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Returns the registry key.
    #[must_use]
    pub const fn id(&self) -> &ServiceId {
        &self.id
    }

    /// Returns the logical service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the entry tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the registered port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the registry service kind, if not a plain service.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Returns whether the entry is a sidecar proxy managed by the registry
    /// on behalf of its parent service.
    #[must_use]
    pub fn is_sidecar_proxy(&self) -> bool {
        self.kind() == Some(CONNECT_PROXY_KIND)
    }
}

/// Registry content keyed by service identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisteredServiceSet(BTreeMap<ServiceId, RegisteredService>);

impl RegisteredServiceSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the entry for an identifier.
    #[must_use]
    pub fn get(&self, id: &ServiceId) -> Option<&RegisteredService> {
        self.0.get(id)
    }

    /// Returns whether an identifier is registered.
    #[must_use]
    pub fn contains(&self, id: &ServiceId) -> bool {
        self.0.contains_key(id)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredService> {
        self.0.values()
    }

    /// Returns the set without sidecar proxy entries.
    #[must_use]
    pub fn without_sidecars(self) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|(_, service)| !service.is_sidecar_proxy())
                .collect(),
        )
    }
}

impl FromIterator<RegisteredService> for RegisteredServiceSet {
    fn from_iter<I: IntoIterator<Item = RegisteredService>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|service| (service.id().clone(), service))
                .collect(),
        )
    }
}
