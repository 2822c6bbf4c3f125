//! Keeps a Consul agent in sync with labelled Docker containers.
//!
//! Usage:
//!
//! ```text
//! registrar [run|unregister-all] [--consul-addr URL] [--label-prefix PREFIX] ...
//! ```
//!
//! `run` (the default) reconciles once and then follows container events
//! until SIGINT or SIGTERM. `unregister-all` removes every service from the
//! agent and exits. Run `registrar --help` for the full flag list and the
//! environment variable behind each flag.

use clap::Parser;
use registrar::{
    app::{self, AppError},
    config::Cli,
    logging::{LoggingError, init_logging},
};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<ExitCode, LoggingError> {
    let cli = Cli::parse();
    init_logging(cli.log_format())?;

    let shutdown = CancellationToken::new();
    let signals = app::spawn_signal_listener(shutdown.clone());
    let outcome = app::execute(cli, shutdown.clone()).await;
    shutdown.cancel();
    if let Err(err) = signals.await {
        error!(error = %err, "signal listener panicked");
    }

    Ok(exit_code(outcome))
}

fn exit_code(outcome: Result<(), AppError>) -> ExitCode {
    match outcome {
        Ok(()) => {
            info!("registrar stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "registrar failed");
            ExitCode::FAILURE
        }
    }
}
