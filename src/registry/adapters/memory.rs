//! In-memory service registry for reconciliation and event tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use crate::registry::{
    domain::{CONNECT_PROXY_KIND, RegisteredService, RegisteredServiceSet},
    ports::{RegistryOperation, ServiceRegistry, ServiceRegistryError, ServiceRegistryResult},
};
use crate::service::domain::{ServiceDescription, ServiceId};

const SIDECAR_SUFFIX: &str = "-sidecar-proxy";
const SIDECAR_PORT: u16 = 21000;
const INJECTED_FAILURE_STATUS: u16 = 500;

/// A call observed by [`InMemoryServiceRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    /// `register` was invoked for an identifier.
    Register(ServiceId),
    /// `deregister` was invoked for an identifier.
    Deregister(ServiceId),
    /// `list_registered` was invoked.
    List,
}

/// Thread-safe in-memory service registry.
///
/// Mirrors the agent behaviour the synchronizer relies on: registration is
/// an upsert, deregistering an absent entry succeeds, and Connect-enabled
/// services get a companion `connect-proxy` entry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServiceRegistry {
    state: Arc<RwLock<InMemoryRegistryState>>,
}

#[derive(Debug, Default)]
struct InMemoryRegistryState {
    services: BTreeMap<ServiceId, RegisteredService>,
    calls: Vec<RegistryCall>,
    failing_ids: BTreeSet<ServiceId>,
    fail_list: bool,
}

impl InMemoryServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry without recording a call.
    ///
    /// # Errors
    ///
    /// Returns registry errors when lock acquisition fails.
    pub fn seed(&self, service: RegisteredService) -> ServiceRegistryResult<()> {
        let mut state = self.write(RegistryOperation::Register)?;
        state.services.insert(service.id().clone(), service);
        Ok(())
    }

    /// Makes every register and deregister call for an identifier fail.
    ///
    /// # Errors
    ///
    /// Returns registry errors when lock acquisition fails.
    pub fn fail_for(&self, service_id: ServiceId) -> ServiceRegistryResult<()> {
        let mut state = self.write(RegistryOperation::Register)?;
        state.failing_ids.insert(service_id);
        Ok(())
    }

    /// Makes `list_registered` fail.
    ///
    /// # Errors
    ///
    /// Returns registry errors when lock acquisition fails.
    pub fn fail_list(&self) -> ServiceRegistryResult<()> {
        let mut state = self.write(RegistryOperation::List)?;
        state.fail_list = true;
        Ok(())
    }

    /// Returns the current entries without recording a call.
    ///
    /// # Errors
    ///
    /// Returns registry errors when lock acquisition fails.
    pub fn snapshot(&self) -> ServiceRegistryResult<RegisteredServiceSet> {
        let state = self.read(RegistryOperation::List)?;
        Ok(state.services.values().cloned().collect())
    }

    /// Returns every call observed so far, in order.
    ///
    /// # Errors
    ///
    /// Returns registry errors when lock acquisition fails.
    pub fn calls(&self) -> ServiceRegistryResult<Vec<RegistryCall>> {
        let state = self.read(RegistryOperation::List)?;
        Ok(state.calls.clone())
    }

    /// Counts register calls for an identifier.
    ///
    /// # Errors
    ///
    /// Returns registry errors when lock acquisition fails.
    pub fn register_count(&self, service_id: &ServiceId) -> ServiceRegistryResult<usize> {
        self.count_calls(|call| matches!(call, RegistryCall::Register(id) if id == service_id))
    }

    /// Counts deregister calls for an identifier.
    ///
    /// # Errors
    ///
    /// Returns registry errors when lock acquisition fails.
    pub fn deregister_count(&self, service_id: &ServiceId) -> ServiceRegistryResult<usize> {
        self.count_calls(|call| matches!(call, RegistryCall::Deregister(id) if id == service_id))
    }

    fn count_calls(&self, predicate: impl Fn(&RegistryCall) -> bool) -> ServiceRegistryResult<usize> {
        let state = self.read(RegistryOperation::List)?;
        Ok(state.calls.iter().filter(|call| predicate(call)).count())
    }

    fn read(
        &self,
        operation: RegistryOperation,
    ) -> ServiceRegistryResult<std::sync::RwLockReadGuard<'_, InMemoryRegistryState>> {
        self.state.read().map_err(|err| {
            ServiceRegistryError::transport(operation, std::io::Error::other(err.to_string()))
        })
    }

    fn write(
        &self,
        operation: RegistryOperation,
    ) -> ServiceRegistryResult<std::sync::RwLockWriteGuard<'_, InMemoryRegistryState>> {
        self.state.write().map_err(|err| {
            ServiceRegistryError::transport(operation, std::io::Error::other(err.to_string()))
        })
    }
}

fn injected_failure(operation: RegistryOperation, service_id: &ServiceId) -> ServiceRegistryError {
    ServiceRegistryError::Rejected {
        operation,
        status: INJECTED_FAILURE_STATUS,
        message: format!("injected failure for {service_id}"),
    }
}

fn sidecar_id(service_id: &ServiceId) -> ServiceRegistryResult<ServiceId> {
    ServiceId::new(format!("{service_id}{SIDECAR_SUFFIX}"))
        .map_err(|err| ServiceRegistryError::invalid_response(RegistryOperation::Register, err))
}

#[async_trait]
impl ServiceRegistry for InMemoryServiceRegistry {
    async fn register(&self, service: &ServiceDescription) -> ServiceRegistryResult<()> {
        let operation = RegistryOperation::Register;
        let mut state = self.write(operation)?;
        let id = service.service_id().clone();
        state.calls.push(RegistryCall::Register(id.clone()));

        if state.failing_ids.contains(&id) {
            return Err(injected_failure(operation, &id));
        }

        let entry = RegisteredService::new(
            id.clone(),
            service.service_name(),
            service.traefik_labels().to_vec(),
            service.service_port(),
        );
        state.services.insert(id.clone(), entry);

        let proxy_id = sidecar_id(&id)?;
        if service.connect() {
            let proxy = RegisteredService::new(
                proxy_id.clone(),
                proxy_id.as_str(),
                Vec::new(),
                SIDECAR_PORT,
            )
            .with_kind(CONNECT_PROXY_KIND);
            state.services.insert(proxy_id, proxy);
        } else {
            state.services.remove(&proxy_id);
        }
        Ok(())
    }

    async fn deregister(&self, service_id: &ServiceId) -> ServiceRegistryResult<()> {
        let operation = RegistryOperation::Deregister;
        let mut state = self.write(operation)?;
        state.calls.push(RegistryCall::Deregister(service_id.clone()));

        if state.failing_ids.contains(service_id) {
            return Err(injected_failure(operation, service_id));
        }

        // The agent drops the managed sidecar together with its parent.
        if state.services.remove(service_id).is_some() {
            let proxy_id = sidecar_id(service_id)?;
            state.services.remove(&proxy_id);
        }
        Ok(())
    }

    async fn list_registered(&self) -> ServiceRegistryResult<RegisteredServiceSet> {
        let operation = RegistryOperation::List;
        let mut state = self.write(operation)?;
        state.calls.push(RegistryCall::List);

        if state.fail_list {
            return Err(ServiceRegistryError::Rejected {
                operation,
                status: INJECTED_FAILURE_STATUS,
                message: "injected list failure".to_owned(),
            });
        }
        Ok(state.services.values().cloned().collect())
    }
}
