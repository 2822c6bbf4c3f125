//! Incremental registry updates driven by runtime lifecycle events.

use super::debounce::DebounceTable;
use crate::container::{
    domain::{ContainerId, RuntimeEvent},
    ports::{ContainerRuntime, ContainerRuntimeError, RuntimeEventStream},
};
use crate::registry::ports::ServiceRegistry;
use crate::service::{
    derive_service,
    domain::{LabelPrefix, ServiceDescription, ServiceId},
};
use crate::sync::domain::{LifecycleAction, SyncSettings};
use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, error, info, warn};

/// Fatal outcomes of event processing.
#[derive(Debug, Error)]
pub enum EventProcessorError {
    /// The runtime reported a stream-level failure before shutdown.
    #[error("runtime event stream failed: {0}")]
    Stream(#[source] ContainerRuntimeError),

    /// The runtime closed the stream before shutdown.
    #[error("runtime event stream ended unexpectedly")]
    StreamClosed,
}

/// Long-lived consumer of runtime lifecycle events.
///
/// Events are read sequentially. Debounce table updates happen inline so
/// per-name changes follow event order, while inspection, registration and
/// deregistration run as tracked background tasks joined at shutdown. Those
/// tasks hold the name's [`SerialGuard`](super::SerialGuard) so registry
/// calls for one name never overlap.
pub struct EventProcessor<R, S>
where
    R: ContainerRuntime + 'static,
    S: ServiceRegistry + 'static,
{
    runtime: Arc<R>,
    registry: Arc<S>,
    settings: SyncSettings,
    debounce: DebounceTable,
    tracker: TaskTracker,
}

impl<R, S> Clone for EventProcessor<R, S>
where
    R: ContainerRuntime + 'static,
    S: ServiceRegistry + 'static,
{
    fn clone(&self) -> Self {
        Self {
            runtime: Arc::clone(&self.runtime),
            registry: Arc::clone(&self.registry),
            settings: self.settings.clone(),
            debounce: self.debounce.clone(),
            tracker: self.tracker.clone(),
        }
    }
}

impl<R, S> EventProcessor<R, S>
where
    R: ContainerRuntime + 'static,
    S: ServiceRegistry + 'static,
{
    /// Creates an event processor with an empty debounce table.
    #[must_use]
    pub fn new(runtime: Arc<R>, registry: Arc<S>, settings: SyncSettings) -> Self {
        let debounce = DebounceTable::new(settings.deregister_delay());
        Self {
            runtime,
            registry,
            settings,
            debounce,
            tracker: TaskTracker::new(),
        }
    }

    /// Returns the processor settings.
    #[must_use]
    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Returns the pending-deregistration table.
    #[must_use]
    pub const fn debounce(&self) -> &DebounceTable {
        &self.debounce
    }

    /// Consumes `events` until shutdown is requested or the stream fails.
    ///
    /// Malformed events are skipped. On return every pending deregistration
    /// has been dropped and all in-flight work has finished.
    ///
    /// # Errors
    ///
    /// Returns [`EventProcessorError`] when the stream fails or ends while
    /// `shutdown` has not been cancelled.
    pub async fn run(
        &self,
        mut events: RuntimeEventStream,
        shutdown: CancellationToken,
    ) -> Result<(), EventProcessorError> {
        info!("listening for runtime events");
        let outcome = loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break Ok(()),
                item = events.next() => match item {
                    Some(Ok(event)) => self.handle_event(&event),
                    Some(Err(ContainerRuntimeError::MalformedEvent(reason))) => {
                        warn!(%reason, "skipping malformed runtime event");
                    }
                    Some(Err(err)) if shutdown.is_cancelled() => {
                        debug!(error = %err, "event stream error after shutdown request");
                        break Ok(());
                    }
                    Some(Err(err)) => break Err(EventProcessorError::Stream(err)),
                    None if shutdown.is_cancelled() => break Ok(()),
                    None => break Err(EventProcessorError::StreamClosed),
                },
            }
        };
        drop(events);
        self.shutdown().await;
        outcome
    }

    /// Applies one event.
    ///
    /// Start-type events inspect the container in the background. When it
    /// yields a service, the deregistration that was pending when the event
    /// arrived is cancelled and the service is registered. Stop-type events
    /// (re)arm the deregistration timer. Other actions are ignored.
    pub fn handle_event(&self, event: &RuntimeEvent) {
        match self.settings.classifier().classify(event.action()) {
            Some(LifecycleAction::Register) => self.on_start(event),
            Some(LifecycleAction::Deregister) => self.on_stop(event),
            None => debug!(
                action = event.action(),
                container = event.container_name(),
                "ignoring unclassified runtime event"
            ),
        }
    }

    /// Waits until every pending timer and background task has finished.
    ///
    /// Test hook for driving the processor without a stream. It briefly
    /// closes the task tracker, so do not call it while [`Self::run`] is
    /// active. The processor accepts new work again afterwards.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    async fn shutdown(&self) {
        let dropped = self.debounce.cancel_all();
        if dropped > 0 {
            info!(dropped, "dropping pending deregistrations on shutdown");
        }
        self.tracker.close();
        self.tracker.wait().await;
        debug!("event processor stopped");
    }

    fn on_start(&self, event: &RuntimeEvent) {
        info!(
            action = event.action(),
            container = event.container_name(),
            "container started"
        );
        let container_id = event.container_id().clone();
        let key = ServiceId::new(event.container_name()).map_or_else(
            |_| container_id.as_str().to_owned(),
            |service_id| service_id.as_str().to_owned(),
        );
        let pending = self.debounce.pending_generation(&key);

        let runtime = Arc::clone(&self.runtime);
        let registry = Arc::clone(&self.registry);
        let debounce = self.debounce.clone();
        let prefix = self.settings.prefix().clone();
        self.tracker.spawn(async move {
            let _serial = debounce.serialize(&key).await;
            let Some(description) =
                describe_container(runtime.as_ref(), &container_id, &prefix).await
            else {
                return;
            };
            if let Some(generation) = pending
                && debounce.cancel_if_current(&key, generation)
            {
                debug!(service_id = %key, "cancelled pending deregistration");
            }
            register_service(registry.as_ref(), &description).await;
        });
    }

    fn on_stop(&self, event: &RuntimeEvent) {
        let Ok(service_id) = ServiceId::new(event.container_name()) else {
            warn!(
                container_id = %event.container_id(),
                action = event.action(),
                "stop event carries no container name; ignoring"
            );
            return;
        };
        info!(
            action = event.action(),
            %service_id,
            delay_ms = self.debounce.grace().as_millis(),
            "container stopped; scheduling deregistration"
        );

        let registry = Arc::clone(&self.registry);
        let key = service_id.as_str().to_owned();
        self.debounce.schedule(&key, &self.tracker, move || async move {
            match registry.deregister(&service_id).await {
                Ok(()) => info!(%service_id, "deregistered service"),
                Err(err) => error!(%service_id, error = %err, "failed to deregister service"),
            }
        });
    }
}

async fn describe_container<R>(
    runtime: &R,
    container_id: &ContainerId,
    prefix: &LabelPrefix,
) -> Option<ServiceDescription>
where
    R: ContainerRuntime + ?Sized,
{
    let snapshot = match runtime.inspect(container_id).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(%container_id, error = %err, "failed to inspect started container");
            return None;
        }
    };
    let description = derive_service(&snapshot, prefix);
    if description.is_none() {
        info!(
            container = snapshot.name(),
            "container exposes no routable service; skipping"
        );
    }
    description
}

async fn register_service<S>(registry: &S, description: &ServiceDescription)
where
    S: ServiceRegistry + ?Sized,
{
    match registry.register(description).await {
        Ok(()) => info!(
            service_id = %description.service_id(),
            service_name = description.service_name(),
            port = description.service_port(),
            connect = description.connect(),
            "registered service"
        ),
        Err(err) => error!(
            service_id = %description.service_id(),
            error = %err,
            "failed to register service"
        ),
    }
}
