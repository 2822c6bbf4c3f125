//! Given steps for registry synchronization BDD scenarios.

use super::world::{SyncWorld, container_id, service_id};
use registrar::{
    container::domain::{ContainerSnapshot, PortMapping},
    registry::domain::RegisteredService,
};
use rstest_bdd_macros::given;
use std::time::Duration;

#[given("a deregistration grace period of {millis:u64} ms")]
fn grace_period(world: &mut SyncWorld, millis: u64) {
    world.grace = Duration::from_millis(millis);
}

#[given(r#"a running container "{name}" routed as "{router}" on host port {port:u16}"#)]
fn routed_container(
    world: &mut SyncWorld,
    name: String,
    router: String,
    port: u16,
) -> Result<(), eyre::Report> {
    let snapshot = ContainerSnapshot::new(format!("/{name}"))
        .with_label("traefik.enable", "true")
        .with_label(
            format!("traefik.http.routers.{router}.rule"),
            format!("Host(`{router}.localhost`)"),
        )
        .with_port(PortMapping::published("80/tcp", port.to_string()));
    world.runtime.put_container(container_id(&name), snapshot)?;
    Ok(())
}

#[given(r#"a running container "{name}" with no published ports"#)]
fn unpublished_container(world: &mut SyncWorld, name: String) -> Result<(), eyre::Report> {
    let snapshot = ContainerSnapshot::new(format!("/{name}"))
        .with_label("com.docker.compose.service", name.as_str())
        .with_port(PortMapping::exposed("5432/tcp"));
    world.runtime.put_container(container_id(&name), snapshot)?;
    Ok(())
}

#[given(r#"a running Connect container "{name}" exposing port {port:u16}"#)]
fn connect_container(world: &mut SyncWorld, name: String, port: u16) -> Result<(), eyre::Report> {
    let snapshot = ContainerSnapshot::new(format!("/{name}"))
        .with_label("traefik.consulcatalog.connect", "true")
        .with_port(PortMapping::exposed(format!("{port}/tcp")));
    world.runtime.put_container(container_id(&name), snapshot)?;
    Ok(())
}

#[given(r#"the registry holds an entry "{name}""#)]
fn registry_entry(world: &mut SyncWorld, name: String) -> Result<(), eyre::Report> {
    let entry = RegisteredService::new(service_id(&name)?, name.as_str(), Vec::new(), 80);
    world.registry.seed(entry)?;
    Ok(())
}
