//! Process-lifetime orchestration of reconciliation and event processing.

use super::{EventProcessor, EventProcessorError, Reconciler, ReconcilerError};
use crate::container::{domain::EventSubscription, ports::ContainerRuntime};
use crate::registry::ports::ServiceRegistry;
use crate::sync::domain::{ReconcileReport, SyncSettings};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Fatal synchronizer failures.
#[derive(Debug, Error)]
pub enum SynchronizerError {
    /// Startup reconciliation could not read its inputs.
    #[error(transparent)]
    Reconcile(#[from] ReconcilerError),

    /// The event stream failed.
    #[error(transparent)]
    Events(#[from] EventProcessorError),
}

/// Keeps the registry in line with the runtime for the process lifetime.
///
/// The event subscription is opened from a timestamp captured before the
/// startup snapshot, so events raised during reconciliation are replayed to
/// the event processor afterwards.
pub struct Synchronizer<R, S, C>
where
    R: ContainerRuntime + 'static,
    S: ServiceRegistry + 'static,
    C: Clock + Send + Sync,
{
    runtime: Arc<R>,
    reconciler: Reconciler<R, S>,
    processor: EventProcessor<R, S>,
    clock: Arc<C>,
}

impl<R, S, C> Synchronizer<R, S, C>
where
    R: ContainerRuntime + 'static,
    S: ServiceRegistry + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a synchronizer.
    #[must_use]
    pub fn new(runtime: Arc<R>, registry: Arc<S>, settings: SyncSettings, clock: Arc<C>) -> Self {
        let reconciler = Reconciler::new(
            Arc::clone(&runtime),
            Arc::clone(&registry),
            settings.prefix().clone(),
        );
        let processor = EventProcessor::new(Arc::clone(&runtime), registry, settings);
        Self {
            runtime,
            reconciler,
            processor,
            clock,
        }
    }

    /// Returns the startup reconciler.
    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler<R, S> {
        &self.reconciler
    }

    /// Returns the event processor.
    #[must_use]
    pub const fn processor(&self) -> &EventProcessor<R, S> {
        &self.processor
    }

    /// Builds the subscription request for events from now on.
    #[must_use]
    pub fn subscription(&self) -> EventSubscription {
        EventSubscription::new(
            self.clock.utc(),
            self.processor.settings().classifier().actions(),
        )
    }

    /// Reconciles once, then processes events until `shutdown` is cancelled.
    ///
    /// Per-item registry failures during reconciliation are logged and do
    /// not stop the synchronizer.
    ///
    /// # Errors
    ///
    /// Returns [`SynchronizerError`] when the startup snapshot cannot be
    /// read or the event stream fails before shutdown.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<ReconcileReport, SynchronizerError> {
        let subscription = self.subscription();
        info!(since = %subscription.since(), "opening runtime event subscription");
        let events = self.runtime.events(&subscription);

        let report = self.reconciler.reconcile().await?;
        if !report.is_clean() {
            warn!(
                failed = report.failures().len(),
                "startup reconciliation left registry changes unapplied"
            );
        }

        self.processor.run(events, shutdown).await?;
        info!("synchronizer stopped");
        Ok(report)
    }
}
