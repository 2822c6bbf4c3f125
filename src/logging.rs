//! Structured logging setup.
//!
//! Filtering follows `RUST_LOG` and defaults to `info`. Output is either a
//! human-readable format or one JSON object per line.

use clap::ValueEnum;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    filter::ParseError,
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines for terminals.
    #[default]
    Pretty,
    /// JSON lines for log collectors.
    Json,
}

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// `RUST_LOG` held an unparseable directive.
    #[error("invalid RUST_LOG filter: {0}")]
    Filter(#[from] ParseError),

    /// A global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Builds a filter from explicit directives, defaulting to `info`.
///
/// # Errors
///
/// Returns [`ParseError`] when a directive is malformed.
pub fn log_filter(directives: &str) -> Result<EnvFilter, ParseError> {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse(directives)
}

/// Installs the global subscriber, filtered by `RUST_LOG`.
///
/// An unset or non-UTF-8 `RUST_LOG` falls back to `info`.
///
/// # Errors
///
/// Returns [`LoggingError`] when `RUST_LOG` is malformed or a subscriber is
/// already installed.
pub fn init_logging(format: LogFormat) -> Result<(), LoggingError> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let filter = log_filter(&directives)?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pretty", LogFormat::Pretty)]
    #[case("json", LogFormat::Json)]
    #[case("JSON", LogFormat::Json)]
    fn log_format_parses_case_insensitively(#[case] raw: &str, #[case] expected: LogFormat) {
        let parsed = LogFormat::from_str(raw, true).expect("format should parse");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("")]
    #[case("registrar=debug")]
    #[case("warn,registrar::sync=trace")]
    fn well_formed_directives_parse(#[case] directives: &str) {
        assert!(log_filter(directives).is_ok());
    }

    #[rstest]
    fn malformed_directives_are_rejected() {
        assert!(log_filter("registrar=verbose").is_err());
    }

    #[rstest]
    fn malformed_directives_surface_as_filter_errors() {
        let err = log_filter("registrar=verbose").expect_err("directive should be rejected");

        assert!(matches!(LoggingError::from(err), LoggingError::Filter(_)));
    }
}
