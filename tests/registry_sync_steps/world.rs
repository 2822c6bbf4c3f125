//! Shared world state for registry synchronization BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use registrar::{
    container::{
        adapters::InMemoryContainerRuntime,
        domain::{ContainerId, RuntimeEvent},
    },
    registry::adapters::InMemoryServiceRegistry,
    service::domain::{LabelPrefix, ServiceId},
    sync::{
        domain::{EventClassifier, SyncSettings},
        services::{EventProcessor, Reconciler},
    },
};
use rstest::fixture;

/// Event processor type used by the BDD world.
pub type TestProcessor = EventProcessor<InMemoryContainerRuntime, InMemoryServiceRegistry>;

/// Scenario world for registry synchronization behaviour tests.
pub struct SyncWorld {
    /// Container runtime double.
    pub runtime: Arc<InMemoryContainerRuntime>,
    /// Registry double.
    pub registry: Arc<InMemoryServiceRegistry>,
    /// Grace period used when the processor is first needed.
    pub grace: Duration,
    processor: Option<TestProcessor>,
}

impl SyncWorld {
    /// Creates a world with empty doubles and a short grace period.
    #[must_use]
    pub fn new() -> Self {
        Self {
            runtime: Arc::new(InMemoryContainerRuntime::new()),
            registry: Arc::new(InMemoryServiceRegistry::new()),
            grace: Duration::from_millis(100),
            processor: None,
        }
    }

    /// Returns the event processor, building it on first use.
    pub fn processor(&mut self) -> Result<&TestProcessor, eyre::Report> {
        if self.processor.is_none() {
            let settings = SyncSettings::new(
                LabelPrefix::default(),
                EventClassifier::default(),
                self.grace,
            )?;
            self.processor = Some(EventProcessor::new(
                Arc::clone(&self.runtime),
                Arc::clone(&self.registry),
                settings,
            ));
        }
        self.processor
            .as_ref()
            .ok_or_else(|| eyre::eyre!("event processor missing from scenario world"))
    }

    /// Builds a reconciler over the world's doubles.
    #[must_use]
    pub fn reconciler(&self) -> Reconciler<InMemoryContainerRuntime, InMemoryServiceRegistry> {
        Reconciler::new(
            Arc::clone(&self.runtime),
            Arc::clone(&self.registry),
            LabelPrefix::default(),
        )
    }
}

impl Default for SyncWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SyncWorld {
    SyncWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Container identifier used for a container name.
#[must_use]
pub fn container_id(name: &str) -> ContainerId {
    ContainerId::new(format!("id-{name}"))
}

/// Lifecycle event for a named container.
#[must_use]
pub fn lifecycle_event(name: &str, action: &str) -> RuntimeEvent {
    RuntimeEvent::new(container_id(name), action, name)
}

/// Parses a service identifier.
pub fn service_id(name: &str) -> Result<ServiceId, eyre::Report> {
    ServiceId::new(name).map_err(eyre::Report::from)
}
