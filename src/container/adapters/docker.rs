//! Docker engine adapter for the container runtime port.

use crate::container::{
    domain::{ContainerId, ContainerSnapshot, EventSubscription, PortMapping, RuntimeEvent},
    ports::{ContainerRuntime, ContainerRuntimeError, ContainerRuntimeResult, RuntimeEventStream},
};
use async_trait::async_trait;
use bollard::{
    Docker,
    container::{InspectContainerOptions, ListContainersOptions},
    errors::Error as DockerError,
    models::{ContainerInspectResponse, EventMessage},
    system::EventsOptions,
};
use chrono::DateTime;
use futures::StreamExt;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const NOT_FOUND_STATUS: u16 = 404;

/// Container runtime backed by the Docker engine API.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Wraps an existing engine client.
    #[must_use]
    pub const fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Connects using the local defaults (`DOCKER_HOST` or the local socket).
    ///
    /// # Errors
    ///
    /// Returns [`ContainerRuntimeError::Runtime`] when the client cannot be
    /// configured.
    pub fn connect() -> ContainerRuntimeResult<Self> {
        let docker = Docker::connect_with_local_defaults().map_err(ContainerRuntimeError::runtime)?;
        Ok(Self::new(docker))
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_running(&self) -> ContainerRuntimeResult<Vec<ContainerId>> {
        let filters = HashMap::from([("status".to_owned(), vec!["running".to_owned()])]);
        let options = ListContainersOptions {
            all: false,
            filters,
            ..Default::default()
        };
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(ContainerRuntimeError::runtime)?;
        Ok(containers
            .into_iter()
            .filter_map(|summary| summary.id)
            .map(ContainerId::new)
            .collect())
    }

    async fn inspect(&self, container_id: &ContainerId) -> ContainerRuntimeResult<ContainerSnapshot> {
        match self
            .docker
            .inspect_container(container_id.as_str(), None::<InspectContainerOptions>)
            .await
        {
            Ok(response) => Ok(snapshot_from_inspect(response)),
            Err(DockerError::DockerResponseServerError {
                status_code: NOT_FOUND_STATUS,
                ..
            }) => Err(ContainerRuntimeError::NotFound(container_id.clone())),
            Err(err) => Err(ContainerRuntimeError::runtime(err)),
        }
    }

    fn events(&self, subscription: &EventSubscription) -> RuntimeEventStream {
        let filters = HashMap::from([
            ("type".to_owned(), vec!["container".to_owned()]),
            ("event".to_owned(), subscription.actions().to_vec()),
        ]);
        let options = EventsOptions {
            since: Some(subscription.since()),
            until: None,
            filters,
        };
        debug!(since = %subscription.since(), "opening docker event subscription");
        self.docker
            .events(Some(options))
            .map(|item| {
                item.map_err(ContainerRuntimeError::runtime)
                    .and_then(event_from_message)
            })
            .boxed()
    }
}

/// Converts an engine inspection response into a [`ContainerSnapshot`].
///
/// The engine serializes labels and port maps with sorted keys; the same
/// ordering is restored here because the client library decodes them into
/// hash maps. Only the first host binding of each port is kept.
#[must_use]
pub fn snapshot_from_inspect(response: ContainerInspectResponse) -> ContainerSnapshot {
    let labels: BTreeMap<String, String> = response
        .config
        .and_then(|config| config.labels)
        .unwrap_or_default()
        .into_iter()
        .collect();
    let ports: BTreeMap<_, _> = response
        .network_settings
        .and_then(|settings| settings.ports)
        .unwrap_or_default()
        .into_iter()
        .collect();

    let snapshot = ContainerSnapshot::new(response.name.unwrap_or_default()).with_labels(labels);
    ports
        .into_iter()
        .fold(snapshot, |acc, (container_port, bindings)| {
            let host_port = bindings
                .and_then(|list| list.into_iter().next())
                .and_then(|binding| binding.host_port);
            let mapping = match host_port {
                Some(host) => PortMapping::published(container_port, host),
                None => PortMapping::exposed(container_port),
            };
            acc.with_port(mapping)
        })
}

fn event_from_message(message: EventMessage) -> ContainerRuntimeResult<RuntimeEvent> {
    let action = message
        .action
        .ok_or_else(|| ContainerRuntimeError::MalformedEvent("missing Action".to_owned()))?;
    let actor = message
        .actor
        .ok_or_else(|| ContainerRuntimeError::MalformedEvent("missing Actor".to_owned()))?;
    let container_id = actor
        .id
        .ok_or_else(|| ContainerRuntimeError::MalformedEvent("missing Actor.ID".to_owned()))?;
    let container_name = actor
        .attributes
        .and_then(|mut attributes| attributes.remove("name"))
        .ok_or_else(|| {
            ContainerRuntimeError::MalformedEvent(format!(
                "event {action} for {container_id} has no name attribute"
            ))
        })?;

    let event = RuntimeEvent::new(ContainerId::new(container_id), action, container_name);
    Ok(match message.time.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
        Some(time) => event.at(time),
        None => event,
    })
}
