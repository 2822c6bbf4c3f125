//! When steps for registry synchronization BDD scenarios.

use super::world::{SyncWorld, lifecycle_event, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when("the registry is reconciled")]
fn reconcile(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    let report = run_async(world.reconciler().reconcile()).wrap_err("reconcile registry")?;
    if !report.is_clean() {
        return Err(eyre::eyre!(
            "reconciliation reported failures: {:?}",
            report.failures()
        ));
    }
    Ok(())
}

#[when(r#"container "{name}" stops"#)]
fn container_stops(world: &mut SyncWorld, name: String) -> Result<(), eyre::Report> {
    world.processor()?.handle_event(&lifecycle_event(&name, "die"));
    Ok(())
}

#[when(r#"container "{name}" stops and starts again within the grace period"#)]
fn container_restarts(world: &mut SyncWorld, name: String) -> Result<(), eyre::Report> {
    let processor = world.processor()?.clone();
    processor.handle_event(&lifecycle_event(&name, "stop"));
    processor.handle_event(&lifecycle_event(&name, "start"));
    run_async(processor.wait_idle());
    Ok(())
}

#[when("the event processor settles")]
fn processor_settles(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    let processor = world.processor()?.clone();
    run_async(processor.wait_idle());
    Ok(())
}
