//! Application wiring: adapters, command dispatch and signal handling.

use crate::config::{Cli, Command, ConfigError};
use crate::container::{
    adapters::DockerRuntime,
    ports::{ContainerRuntime, ContainerRuntimeError},
};
use crate::registry::{
    adapters::ConsulRegistry,
    ports::{ServiceRegistry, ServiceRegistryError},
};
use crate::sync::{
    domain::SyncSettings,
    services::{Synchronizer, SynchronizerError, unregister_all},
};
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Top-level failures; each one maps to a non-zero exit status.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The container runtime could not be reached.
    #[error("container runtime unavailable: {0}")]
    Runtime(#[from] ContainerRuntimeError),

    /// The registry client could not be built or listed.
    #[error(transparent)]
    Registry(#[from] ServiceRegistryError),

    /// Synchronization stopped on a fatal error.
    #[error(transparent)]
    Sync(#[from] SynchronizerError),

    /// Some services could not be removed.
    #[error("{failed} service(s) could not be unregistered")]
    UnregisterIncomplete {
        /// Number of failed deregistrations.
        failed: usize,
    },
}

/// Validates settings, builds the adapters and runs the selected command.
///
/// # Errors
///
/// Returns [`AppError`] for invalid settings, unreachable collaborators, a
/// fatal event stream failure, or an incomplete purge.
pub async fn execute(cli: Cli, shutdown: CancellationToken) -> Result<(), AppError> {
    let command = cli.selected_command();
    let config = cli.settings.into_config()?;
    let registry = Arc::new(ConsulRegistry::new(config.consul())?);
    info!(
        consul = %registry.base_url(),
        prefix = %config.sync().prefix(),
        ?command,
        "starting registrar"
    );

    match command {
        Command::Run => {
            let runtime = Arc::new(DockerRuntime::connect()?);
            run_sync(runtime, registry, config.sync().clone(), shutdown).await
        }
        Command::UnregisterAll => purge(registry.as_ref()).await,
    }
}

/// Runs the synchronizer against arbitrary adapters until shutdown.
///
/// # Errors
///
/// Returns [`AppError::Sync`] when startup reconciliation cannot read its
/// inputs or the event stream fails before shutdown.
pub async fn run_sync<R, S>(
    runtime: Arc<R>,
    registry: Arc<S>,
    settings: SyncSettings,
    shutdown: CancellationToken,
) -> Result<(), AppError>
where
    R: ContainerRuntime + 'static,
    S: ServiceRegistry + 'static,
{
    let synchronizer = Synchronizer::new(runtime, registry, settings, Arc::new(DefaultClock));
    synchronizer.run(shutdown).await?;
    Ok(())
}

/// Removes every service from the registry.
///
/// # Errors
///
/// Returns [`AppError::Registry`] when listing fails or
/// [`AppError::UnregisterIncomplete`] when any removal fails.
pub async fn purge<S>(registry: &S) -> Result<(), AppError>
where
    S: ServiceRegistry + ?Sized,
{
    let report = unregister_all(registry).await?;
    if report.is_clean() {
        Ok(())
    } else {
        Err(AppError::UnregisterIncomplete {
            failed: report.failures().len(),
        })
    }
}

/// Cancels `shutdown` on SIGINT or SIGTERM.
///
/// The listener exits quietly once `shutdown` is cancelled by anyone else.
#[must_use]
pub fn spawn_signal_listener(shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = shutdown.cancelled() => {}
            signal = wait_for_signal() => match signal {
                Ok(name) => {
                    info!(signal = name, "received signal, stopping");
                    shutdown.cancel();
                }
                Err(err) => warn!(error = %err, "failed to listen for shutdown signals"),
            },
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
}
