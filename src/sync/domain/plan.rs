//! Startup reconciliation diff and its outcome.

use super::LifecycleAction;
use crate::registry::{domain::RegisteredServiceSet, ports::ServiceRegistryError};
use crate::service::domain::{ServiceDescription, ServiceId};
use std::collections::BTreeMap;

/// Work needed to bring the registry in line with live containers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcilePlan {
    to_register: Vec<ServiceDescription>,
    to_remove: Vec<ServiceId>,
}

impl ReconcilePlan {
    /// Diffs the live set against the registered set.
    ///
    /// Live entries already present in the registry are left alone even if
    /// their metadata differs; changes reach the registry through start-type
    /// events.
    #[must_use]
    pub fn compute(
        live: &BTreeMap<ServiceId, ServiceDescription>,
        registered: &RegisteredServiceSet,
    ) -> Self {
        let to_register = live
            .values()
            .filter(|description| !registered.contains(description.service_id()))
            .cloned()
            .collect();
        let to_remove = registered
            .iter()
            .map(|service| service.id())
            .filter(|id| !live.contains_key(*id))
            .cloned()
            .collect();
        Self {
            to_register,
            to_remove,
        }
    }

    /// Returns descriptions missing from the registry.
    #[must_use]
    pub fn to_register(&self) -> &[ServiceDescription] {
        &self.to_register
    }

    /// Returns registered identifiers without a live container.
    #[must_use]
    pub fn to_remove(&self) -> &[ServiceId] {
        &self.to_remove
    }

    /// Returns whether the registry is already in sync.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_register.is_empty() && self.to_remove.is_empty()
    }

    /// Splits the plan into its two halves.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ServiceDescription>, Vec<ServiceId>) {
        (self.to_register, self.to_remove)
    }
}

/// One item of a batch that failed.
#[derive(Debug, Clone)]
pub struct ReconcileFailure {
    service_id: ServiceId,
    action: LifecycleAction,
    error: ServiceRegistryError,
}

impl ReconcileFailure {
    /// Records a failed item.
    #[must_use]
    pub const fn new(
        service_id: ServiceId,
        action: LifecycleAction,
        error: ServiceRegistryError,
    ) -> Self {
        Self {
            service_id,
            action,
            error,
        }
    }

    /// Returns the identifier the item applied to.
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    /// Returns what was attempted.
    #[must_use]
    pub const fn action(&self) -> LifecycleAction {
        self.action
    }

    /// Returns the registry error.
    #[must_use]
    pub const fn error(&self) -> &ServiceRegistryError {
        &self.error
    }
}

/// Outcome of one reconciliation or purge pass.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    registered: Vec<ServiceId>,
    deregistered: Vec<ServiceId>,
    failures: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result of one item.
    pub fn record(
        &mut self,
        service_id: ServiceId,
        action: LifecycleAction,
        result: Result<(), ServiceRegistryError>,
    ) {
        match (result, action) {
            (Ok(()), LifecycleAction::Register) => self.registered.push(service_id),
            (Ok(()), LifecycleAction::Deregister) => self.deregistered.push(service_id),
            (Err(error), _) => self
                .failures
                .push(ReconcileFailure::new(service_id, action, error)),
        }
    }

    /// Returns identifiers registered during the pass.
    #[must_use]
    pub fn registered(&self) -> &[ServiceId] {
        &self.registered
    }

    /// Returns identifiers deregistered during the pass.
    #[must_use]
    pub fn deregistered(&self) -> &[ServiceId] {
        &self.deregistered
    }

    /// Returns failed items.
    #[must_use]
    pub fn failures(&self) -> &[ReconcileFailure] {
        &self.failures
    }

    /// Returns whether every item succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
