//! In-memory container runtime adapter for reconciliation and event tests.

use crate::container::{
    domain::{ContainerId, ContainerSnapshot, EventSubscription, RuntimeEvent},
    ports::{ContainerRuntime, ContainerRuntimeError, ContainerRuntimeResult, RuntimeEventStream},
};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;

/// In-memory container runtime.
///
/// Containers are held in a map and events are pushed by the caller. The
/// adapter records the last subscription request so tests can assert on the
/// replay timestamp and action filter.
#[derive(Debug, Clone)]
pub struct InMemoryContainerRuntime {
    state: Arc<RwLock<InMemoryRuntimeState>>,
    sender: mpsc::UnboundedSender<ContainerRuntimeResult<RuntimeEvent>>,
    receiver: Arc<Mutex<Option<mpsc::UnboundedReceiver<ContainerRuntimeResult<RuntimeEvent>>>>>,
}

#[derive(Debug, Default)]
struct InMemoryRuntimeState {
    running: BTreeMap<ContainerId, ContainerSnapshot>,
    inspect_failures: BTreeMap<ContainerId, String>,
    vanished: BTreeSet<ContainerId>,
    subscription: Option<EventSubscription>,
}

impl Default for InMemoryContainerRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContainerRuntime {
    /// Creates a runtime with no containers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(RwLock::new(InMemoryRuntimeState::default())),
            sender,
            receiver: Arc::new(Mutex::new(Some(receiver))),
        }
    }

    /// Adds or replaces a running container.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn put_container(
        &self,
        container_id: ContainerId,
        snapshot: ContainerSnapshot,
    ) -> ContainerRuntimeResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ContainerRuntimeError::runtime(std::io::Error::other(err.to_string())))?;
        state.running.insert(container_id, snapshot);
        Ok(())
    }

    /// Removes a container so it is neither listed nor inspectable.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn remove_container(&self, container_id: &ContainerId) -> ContainerRuntimeResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ContainerRuntimeError::runtime(std::io::Error::other(err.to_string())))?;
        state.running.remove(container_id);
        Ok(())
    }

    /// Makes inspection of a container fail with a runtime error.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn fail_inspect(
        &self,
        container_id: ContainerId,
        message: impl Into<String>,
    ) -> ContainerRuntimeResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ContainerRuntimeError::runtime(std::io::Error::other(err.to_string())))?;
        state.inspect_failures.insert(container_id, message.into());
        Ok(())
    }

    /// Keeps a container in listings but reports it as gone on inspection,
    /// as happens when it exits between the two calls.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn vanish_on_inspect(&self, container_id: ContainerId) -> ContainerRuntimeResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ContainerRuntimeError::runtime(std::io::Error::other(err.to_string())))?;
        state.vanished.insert(container_id);
        Ok(())
    }

    /// Queues an event on the subscription stream.
    ///
    /// Events pushed before the subscription is opened are replayed to it.
    pub fn push_event(&self, event: RuntimeEvent) {
        self.push(Ok(event));
    }

    /// Queues a stream-level error on the subscription stream.
    pub fn push_error(&self, error: ContainerRuntimeError) {
        self.push(Err(error));
    }

    /// Returns the last subscription request, if any.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn last_subscription(&self) -> ContainerRuntimeResult<Option<EventSubscription>> {
        let state = self
            .state
            .read()
            .map_err(|err| ContainerRuntimeError::runtime(std::io::Error::other(err.to_string())))?;
        Ok(state.subscription.clone())
    }

    fn push(&self, item: ContainerRuntimeResult<RuntimeEvent>) {
        // Sending only fails once the subscription stream was dropped.
        if self.sender.send(item).is_err() {
            tracing::debug!("event pushed after subscription closed");
        }
    }

    fn take_receiver(
        &self,
    ) -> Option<mpsc::UnboundedReceiver<ContainerRuntimeResult<RuntimeEvent>>> {
        self.receiver
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl ContainerRuntime for InMemoryContainerRuntime {
    async fn list_running(&self) -> ContainerRuntimeResult<Vec<ContainerId>> {
        let state = self
            .state
            .read()
            .map_err(|err| ContainerRuntimeError::runtime(std::io::Error::other(err.to_string())))?;
        Ok(state
            .running
            .keys()
            .chain(&state.vanished)
            .cloned()
            .collect())
    }

    async fn inspect(&self, container_id: &ContainerId) -> ContainerRuntimeResult<ContainerSnapshot> {
        let state = self
            .state
            .read()
            .map_err(|err| ContainerRuntimeError::runtime(std::io::Error::other(err.to_string())))?;

        if let Some(message) = state.inspect_failures.get(container_id) {
            return Err(ContainerRuntimeError::runtime(std::io::Error::other(
                message.clone(),
            )));
        }

        if state.vanished.contains(container_id) {
            return Err(ContainerRuntimeError::NotFound(container_id.clone()));
        }

        state
            .running
            .get(container_id)
            .cloned()
            .ok_or_else(|| ContainerRuntimeError::NotFound(container_id.clone()))
    }

    fn events(&self, subscription: &EventSubscription) -> RuntimeEventStream {
        if let Ok(mut state) = self.state.write() {
            state.subscription = Some(subscription.clone());
        }

        match self.take_receiver() {
            Some(receiver) => stream::unfold(receiver, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })
            .boxed(),
            None => stream::once(async { Err(ContainerRuntimeError::SubscriptionTaken) }).boxed(),
        }
    }
}
