//! Runtime port for container discovery and lifecycle events.

use crate::container::domain::{ContainerId, ContainerSnapshot, EventSubscription, RuntimeEvent};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;
use thiserror::Error;

/// Result type for container runtime operations.
pub type ContainerRuntimeResult<T> = Result<T, ContainerRuntimeError>;

/// Live stream of runtime events.
pub type RuntimeEventStream = BoxStream<'static, ContainerRuntimeResult<RuntimeEvent>>;

/// Read-only contract over the container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lists identifiers of currently running containers.
    async fn list_running(&self) -> ContainerRuntimeResult<Vec<ContainerId>>;

    /// Inspects a container.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerRuntimeError::NotFound`] when the container no
    /// longer exists.
    async fn inspect(&self, container_id: &ContainerId) -> ContainerRuntimeResult<ContainerSnapshot>;

    /// Opens a container event subscription.
    ///
    /// The returned stream yields an error item when the subscription breaks;
    /// [`ContainerRuntimeError::MalformedEvent`] items describe single events
    /// that could not be decoded and do not end the stream.
    fn events(&self, subscription: &EventSubscription) -> RuntimeEventStream;
}

/// Errors returned by container runtime adapters.
#[derive(Debug, Clone, Error)]
pub enum ContainerRuntimeError {
    /// The container does not exist (anymore).
    #[error("container {0} not found")]
    NotFound(ContainerId),

    /// A single event lacked fields needed to process it.
    #[error("malformed runtime event: {0}")]
    MalformedEvent(String),

    /// The event subscription was already consumed.
    #[error("runtime event subscription already taken")]
    SubscriptionTaken,

    /// Generic runtime failure.
    #[error("container runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ContainerRuntimeError {
    /// Wraps a runtime error from the adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
