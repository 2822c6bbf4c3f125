//! End-to-end synchronizer tests over in-memory adapters.

use crate::container::{
    adapters::InMemoryContainerRuntime,
    domain::{ContainerId, ContainerSnapshot, PortMapping, RuntimeEvent},
};
use crate::registry::{adapters::InMemoryServiceRegistry, domain::RegisteredService};
use crate::service::domain::ServiceId;
use crate::sync::{domain::SyncSettings, services::Synchronizer};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn started_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn id(value: &str) -> ServiceId {
    ServiceId::new(value).expect("valid identifier")
}

fn routable(name: &str, host_port: &str) -> ContainerSnapshot {
    ContainerSnapshot::new(format!("/{name}"))
        .with_label(
            format!("traefik.http.routers.{name}.rule"),
            format!("Host(`{name}.localhost`)"),
        )
        .with_port(PortMapping::published("80/tcp", host_port))
}

#[tokio::test(start_paused = true)]
async fn run_reconciles_then_follows_events_until_shutdown() {
    let runtime = Arc::new(InMemoryContainerRuntime::new());
    runtime
        .put_container(ContainerId::new("c-web"), routable("web", "32768"))
        .expect("put should succeed");
    let registry = Arc::new(InMemoryServiceRegistry::new());
    registry
        .seed(RegisteredService::new(id("stale"), "stale", Vec::new(), 80))
        .expect("seed");

    // Queued before the subscription opens; the runtime replays it.
    runtime
        .put_container(ContainerId::new("c-api"), routable("api", "32769"))
        .expect("put should succeed");
    runtime.push_event(RuntimeEvent::new(ContainerId::new("c-api"), "start", "api"));

    let synchronizer = Synchronizer::new(
        Arc::clone(&runtime),
        Arc::clone(&registry),
        SyncSettings::default(),
        Arc::new(FixedClock(started_at())),
    );
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    let task = tokio::spawn(async move { synchronizer.run(token).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.cancel();
    let report = task
        .await
        .expect("run task should join")
        .expect("synchronizer should stop cleanly");

    assert!(report.deregistered().contains(&id("stale")));
    let listed = registry.snapshot().expect("snapshot");
    assert!(listed.contains(&id("web")));
    assert!(listed.contains(&id("api")));
    assert!(!listed.contains(&id("stale")));

    let subscription = runtime
        .last_subscription()
        .expect("subscription lookup")
        .expect("subscription should be recorded");
    assert_eq!(subscription.since(), started_at());
    assert!(subscription.actions().iter().any(|action| action == "start"));
    assert!(subscription.actions().iter().any(|action| action == "rename"));
}

#[tokio::test(start_paused = true)]
async fn run_fails_when_startup_snapshot_is_unreadable() {
    let runtime = Arc::new(InMemoryContainerRuntime::new());
    let registry = Arc::new(InMemoryServiceRegistry::new());
    registry.fail_list().expect("fail_list");
    let synchronizer = Synchronizer::new(
        runtime,
        registry,
        SyncSettings::default(),
        Arc::new(FixedClock(started_at())),
    );

    let result = synchronizer.run(CancellationToken::new()).await;

    assert!(result.is_err());
}
