//! Maintenance operation removing every service from the registry.

use super::reconciler::log_outcome;
use crate::registry::ports::{ServiceRegistry, ServiceRegistryResult};
use crate::sync::domain::{LifecycleAction, ReconcileReport};
use futures::future::join_all;
use tracing::info;

/// Deregisters every service currently held by the registry.
///
/// Sidecar proxies are skipped; the registry drops them with their parent.
/// Deregistrations run concurrently and each failure is reported
/// individually.
///
/// # Errors
///
/// Returns the registry error when the initial listing fails.
pub async fn unregister_all<S>(registry: &S) -> ServiceRegistryResult<ReconcileReport>
where
    S: ServiceRegistry + ?Sized,
{
    info!("unregistering all services");
    let services = registry.list_registered().await?.without_sidecars();

    let removals = join_all(services.iter().map(|service| async move {
        let result = registry.deregister(service.id()).await;
        (service.id().clone(), result)
    }))
    .await;

    let mut report = ReconcileReport::new();
    for (service_id, result) in removals {
        log_outcome(&service_id, LifecycleAction::Deregister, &result);
        report.record(service_id, LifecycleAction::Deregister, result);
    }
    info!(
        deregistered = report.deregistered().len(),
        failed = report.failures().len(),
        "unregister-all finished"
    );
    Ok(report)
}
