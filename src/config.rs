//! Command line and environment configuration.
//!
//! Every flag can also be set through the environment variable named in
//! its help text. Flags are global so they may follow either subcommand.

use crate::logging::LogFormat;
use crate::registry::adapters::{ConsulConfig, DEFAULT_CONSUL_ADDR};
use crate::service::domain::{DEFAULT_LABEL_PREFIX, LabelPrefix, ServiceDomainError};
use crate::sync::domain::{EventClassifier, SyncDomainError, SyncSettings};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use thiserror::Error;

/// Keeps a Consul agent in sync with labelled Docker containers.
#[derive(Debug, Clone, Parser)]
#[command(name = "registrar", version, long_about = None)]
pub struct Cli {
    /// Shared settings.
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Operation to perform; defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the requested operation, defaulting to [`Command::Run`].
    #[must_use]
    pub fn selected_command(&self) -> Command {
        self.command.unwrap_or_default()
    }

    /// Returns the log output format. Logging is installed from this value
    /// before the remaining settings are validated.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.settings.log_format
    }
}

/// Operations exposed by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Subcommand)]
pub enum Command {
    /// Reconcile once, then follow container events until interrupted.
    #[default]
    Run,
    /// Remove every service registered on the agent and exit.
    UnregisterAll,
}

/// Raw settings as parsed from flags and environment.
#[derive(Debug, Clone, Args)]
pub struct SettingsArgs {
    /// Consul agent address.
    #[arg(long, env = "CONSUL_ADDR", default_value = DEFAULT_CONSUL_ADDR, global = true)]
    pub consul_addr: String,

    /// Consul ACL token.
    #[arg(long, env = "CONSUL_HTTP_TOKEN", hide_env_values = true, global = true)]
    pub consul_token: Option<String>,

    /// Prefix of routing labels.
    #[arg(long, env = "LABEL_PREFIX", default_value = DEFAULT_LABEL_PREFIX, global = true)]
    pub label_prefix: String,

    /// Grace period before a stopped container is deregistered, in
    /// milliseconds.
    #[arg(long, env = "DEREGISTER_DELAY_MS", default_value_t = 5000, global = true)]
    pub deregister_delay_ms: u64,

    /// Runtime actions that register a container.
    #[arg(
        long,
        env = "REGISTER_EVENTS",
        value_delimiter = ',',
        default_values = ["start", "restart", "update"],
        global = true
    )]
    pub register_events: Vec<String>,

    /// Runtime actions that schedule deregistration.
    #[arg(
        long,
        env = "DEREGISTER_EVENTS",
        value_delimiter = ',',
        default_values = ["die", "stop", "kill", "destroy", "rename"],
        global = true
    )]
    pub deregister_events: Vec<String>,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,
}

/// Errors raised while validating settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The Consul address was blank.
    #[error("consul address must not be empty")]
    EmptyConsulAddress,

    /// The label prefix was invalid.
    #[error("invalid label prefix: {0}")]
    LabelPrefix(#[from] ServiceDomainError),

    /// Event lists or the grace period were invalid.
    #[error("invalid synchronizer settings: {0}")]
    Sync(#[from] SyncDomainError),
}

/// Validated application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    consul: ConsulConfig,
    sync: SyncSettings,
}

impl AppConfig {
    /// Returns the Consul connection settings.
    #[must_use]
    pub const fn consul(&self) -> &ConsulConfig {
        &self.consul
    }

    /// Returns the synchronizer settings.
    #[must_use]
    pub const fn sync(&self) -> &SyncSettings {
        &self.sync
    }
}

impl SettingsArgs {
    /// Validates raw settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a blank address or prefix, a zero delay,
    /// or empty or overlapping event lists.
    pub fn into_config(self) -> Result<AppConfig, ConfigError> {
        if self.consul_addr.trim().is_empty() {
            return Err(ConfigError::EmptyConsulAddress);
        }
        let consul = match self.consul_token {
            Some(token) => ConsulConfig::new(self.consul_addr).with_token(token),
            None => ConsulConfig::new(self.consul_addr),
        };

        let prefix = LabelPrefix::new(self.label_prefix)?;
        let classifier = EventClassifier::new(&self.register_events, &self.deregister_events)?;
        let sync = SyncSettings::new(
            prefix,
            classifier,
            Duration::from_millis(self.deregister_delay_ms),
        )?;

        Ok(AppConfig { consul, sync })
    }
}
