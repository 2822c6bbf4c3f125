//! Behaviour tests for registry synchronization.

mod registry_sync_steps;

use registry_sync_steps::world::{SyncWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/registry_sync.feature",
    name = "Startup reconciliation registers labelled containers and removes stale entries"
)]
#[tokio::test(flavor = "multi_thread")]
async fn startup_reconciliation(world: SyncWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/registry_sync.feature",
    name = "A quick restart keeps the registration"
)]
#[tokio::test(flavor = "multi_thread")]
async fn quick_restart_keeps_registration(world: SyncWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/registry_sync.feature",
    name = "A stopped container is deregistered after the grace period"
)]
#[tokio::test(flavor = "multi_thread")]
async fn stopped_container_is_deregistered(world: SyncWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/registry_sync.feature",
    name = "Connect sidecars survive reconciliation"
)]
#[tokio::test(flavor = "multi_thread")]
async fn connect_sidecars_survive(world: SyncWorld) {
    let _ = world;
}
