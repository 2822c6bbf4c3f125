//! Then steps for registry synchronization BDD scenarios.

use super::world::{SyncWorld, service_id};
use rstest_bdd_macros::then;

#[then(r#"the registry holds "{name}" named "{service}" on port {port:u16}"#)]
fn registry_holds(
    world: &mut SyncWorld,
    name: String,
    service: String,
    port: u16,
) -> Result<(), eyre::Report> {
    let listed = world.registry.snapshot()?;
    let entry = listed
        .get(&service_id(&name)?)
        .ok_or_else(|| eyre::eyre!("expected '{name}' to be registered"))?;
    if entry.service() != service || entry.port() != port {
        return Err(eyre::eyre!(
            "expected {service}:{port}, found {}:{}",
            entry.service(),
            entry.port()
        ));
    }
    Ok(())
}

#[then(r#"the registry does not hold "{name}""#)]
fn registry_lacks(world: &mut SyncWorld, name: String) -> Result<(), eyre::Report> {
    if world.registry.snapshot()?.contains(&service_id(&name)?) {
        return Err(eyre::eyre!("expected '{name}' to be absent"));
    }
    Ok(())
}

#[then(r#"the registry holds "{name}" as a sidecar"#)]
fn registry_holds_sidecar(world: &mut SyncWorld, name: String) -> Result<(), eyre::Report> {
    let listed = world.registry.snapshot()?;
    let is_sidecar = listed
        .get(&service_id(&name)?)
        .is_some_and(|entry| entry.is_sidecar_proxy());
    if !is_sidecar {
        return Err(eyre::eyre!("expected '{name}' to be a sidecar proxy entry"));
    }
    Ok(())
}

#[then(r#""{name}" was registered {count:usize} times"#)]
fn registered_times(world: &mut SyncWorld, name: String, count: usize) -> Result<(), eyre::Report> {
    let actual = world.registry.register_count(&service_id(&name)?)?;
    if actual != count {
        return Err(eyre::eyre!("expected {count} registrations of '{name}', saw {actual}"));
    }
    Ok(())
}

#[then(r#""{name}" was deregistered {count:usize} times"#)]
fn deregistered_times(
    world: &mut SyncWorld,
    name: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let actual = world.registry.deregister_count(&service_id(&name)?)?;
    if actual != count {
        return Err(eyre::eyre!("expected {count} deregistrations of '{name}', saw {actual}"));
    }
    Ok(())
}
