//! Unit tests for the in-memory service registry.

use crate::registry::{
    adapters::{InMemoryServiceRegistry, RegistryCall},
    ports::{RegistryOperation, ServiceRegistry, ServiceRegistryError},
};
use crate::service::domain::{ServiceDescription, ServiceId};
use rstest::{fixture, rstest};

#[fixture]
fn registry() -> InMemoryServiceRegistry {
    InMemoryServiceRegistry::new()
}

fn id(value: &str) -> ServiceId {
    ServiceId::new(value).expect("valid identifier")
}

fn description(name: &str, connect: bool) -> ServiceDescription {
    ServiceDescription::new(
        id(name),
        name,
        8080,
        vec![format!("traefik.http.routers.{name}.rule=Path(`/`)")],
        connect,
    )
    .expect("valid description")
}

#[rstest]
#[tokio::test]
async fn register_is_an_upsert(registry: InMemoryServiceRegistry) {
    registry
        .register(&description("web", false))
        .await
        .expect("first register should succeed");
    registry
        .register(&description("web", false))
        .await
        .expect("second register should succeed");

    let listed = registry.list_registered().await.expect("list should succeed");

    assert_eq!(listed.len(), 1);
    assert_eq!(registry.register_count(&id("web")).expect("count"), 2);
}

#[rstest]
#[tokio::test]
async fn connect_registration_adds_sidecar_entry(registry: InMemoryServiceRegistry) {
    registry
        .register(&description("web", true))
        .await
        .expect("register should succeed");

    let listed = registry.snapshot().expect("snapshot should succeed");

    assert_eq!(listed.len(), 2);
    let proxy = listed
        .get(&id("web-sidecar-proxy"))
        .expect("sidecar should be listed");
    assert!(proxy.is_sidecar_proxy());
}

#[rstest]
#[tokio::test]
async fn deregister_absent_entry_succeeds(registry: InMemoryServiceRegistry) {
    registry
        .deregister(&id("never-registered"))
        .await
        .expect("absent entry should count as removed");

    assert_eq!(
        registry.calls().expect("calls"),
        vec![RegistryCall::Deregister(id("never-registered"))]
    );
}

#[rstest]
#[tokio::test]
async fn deregister_drops_parent_and_sidecar(registry: InMemoryServiceRegistry) {
    registry
        .register(&description("web", true))
        .await
        .expect("register should succeed");
    registry
        .deregister(&id("web"))
        .await
        .expect("deregister should succeed");

    assert!(registry.snapshot().expect("snapshot").is_empty());
}

#[rstest]
#[tokio::test]
async fn injected_failures_surface_as_rejections(registry: InMemoryServiceRegistry) {
    registry.fail_for(id("web")).expect("fail_for");
    registry.fail_list().expect("fail_list");

    let register = registry.register(&description("web", false)).await;
    let list = registry.list_registered().await;

    assert!(matches!(
        register,
        Err(ServiceRegistryError::Rejected {
            operation: RegistryOperation::Register,
            status: 500,
            ..
        })
    ));
    assert!(matches!(
        list,
        Err(ServiceRegistryError::Rejected {
            operation: RegistryOperation::List,
            ..
        })
    ));
}
