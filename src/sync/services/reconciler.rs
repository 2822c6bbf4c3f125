//! One-shot startup reconciliation of the registry against live containers.

use crate::container::ports::{ContainerRuntime, ContainerRuntimeError};
use crate::registry::ports::{ServiceRegistry, ServiceRegistryError};
use crate::service::{
    derive_service,
    domain::{LabelPrefix, ServiceDescription, ServiceId},
};
use crate::sync::domain::{LifecycleAction, ReconcilePlan, ReconcileReport};
use futures::future::{join, join_all};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Failures that abort a reconciliation pass before any change is applied.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// Listing or inspecting running containers failed.
    #[error("failed to read running containers: {0}")]
    Runtime(#[from] ContainerRuntimeError),

    /// Reading the registry snapshot failed.
    #[error("failed to read registered services: {0}")]
    Registry(#[from] ServiceRegistryError),
}

/// Result type for reconciliation.
pub type ReconcilerResult<T> = Result<T, ReconcilerError>;

/// Diffs running containers against the registry and applies the diff.
///
/// Each registration and deregistration is an independent unit of work: a
/// failing item is logged and reported while its siblings proceed.
pub struct Reconciler<R, S>
where
    R: ContainerRuntime,
    S: ServiceRegistry,
{
    runtime: Arc<R>,
    registry: Arc<S>,
    prefix: LabelPrefix,
}

impl<R, S> Reconciler<R, S>
where
    R: ContainerRuntime,
    S: ServiceRegistry,
{
    /// Creates a reconciler.
    #[must_use]
    pub const fn new(runtime: Arc<R>, registry: Arc<S>, prefix: LabelPrefix) -> Self {
        Self {
            runtime,
            registry,
            prefix,
        }
    }

    /// Runs one full pass: snapshot both sides, diff, apply.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcilerError`] when either snapshot cannot be read.
    /// Per-item registry failures are reported in the returned
    /// [`ReconcileReport`] instead.
    pub async fn reconcile(&self) -> ReconcilerResult<ReconcileReport> {
        info!("reconciling registry with running containers");
        let plan = self.plan().await?;
        if plan.is_empty() {
            info!("registry already in sync");
            return Ok(ReconcileReport::new());
        }
        let report = self.apply(plan).await;
        info!(
            registered = report.registered().len(),
            deregistered = report.deregistered().len(),
            failed = report.failures().len(),
            "reconciliation finished"
        );
        Ok(report)
    }

    /// Computes the diff without applying it.
    ///
    /// Sidecar proxy entries are left out of the registered side.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcilerError`] when either snapshot cannot be read.
    pub async fn plan(&self) -> ReconcilerResult<ReconcilePlan> {
        let live = self.live_services().await?;
        let registered = self.registry.list_registered().await?.without_sidecars();
        debug!(
            live = live.len(),
            registered = registered.len(),
            "computed reconciliation inputs"
        );
        Ok(ReconcilePlan::compute(&live, &registered))
    }

    /// Builds the live set keyed by service identifier.
    ///
    /// Containers that vanish between listing and inspection are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcilerError::Runtime`] on any other runtime failure.
    pub async fn live_services(&self) -> ReconcilerResult<BTreeMap<ServiceId, ServiceDescription>> {
        let container_ids = self.runtime.list_running().await?;
        let inspections = join_all(container_ids.iter().map(|id| self.runtime.inspect(id))).await;

        let mut live = BTreeMap::new();
        for (container_id, inspection) in container_ids.iter().zip(inspections) {
            match inspection {
                Ok(snapshot) => match derive_service(&snapshot, &self.prefix) {
                    Some(description) => {
                        live.insert(description.service_id().clone(), description);
                    }
                    None => debug!(
                        container = snapshot.name(),
                        "container exposes no routable service"
                    ),
                },
                Err(ContainerRuntimeError::NotFound(_)) => {
                    debug!(%container_id, "container disappeared before inspection; skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(live)
    }

    /// Applies a plan with every item running concurrently.
    pub async fn apply(&self, plan: ReconcilePlan) -> ReconcileReport {
        let (to_register, to_remove) = plan.into_parts();
        let registry = self.registry.as_ref();

        let registrations = join_all(to_register.iter().map(|description| async move {
            let result = registry.register(description).await;
            (description.service_id().clone(), result)
        }));
        let removals = join_all(to_remove.into_iter().map(|service_id| async move {
            let result = registry.deregister(&service_id).await;
            (service_id, result)
        }));
        let (registered, removed) = join(registrations, removals).await;

        let mut report = ReconcileReport::new();
        for (service_id, result) in registered {
            log_outcome(&service_id, LifecycleAction::Register, &result);
            report.record(service_id, LifecycleAction::Register, result);
        }
        for (service_id, result) in removed {
            log_outcome(&service_id, LifecycleAction::Deregister, &result);
            report.record(service_id, LifecycleAction::Deregister, result);
        }
        report
    }
}

pub(super) fn log_outcome(
    service_id: &ServiceId,
    action: LifecycleAction,
    result: &Result<(), ServiceRegistryError>,
) {
    match result {
        Ok(()) => info!(%service_id, %action, "applied registry change"),
        Err(err) => error!(%service_id, %action, error = %err, "registry change failed"),
    }
}
