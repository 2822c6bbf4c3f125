//! Error types for service domain validation.

use thiserror::Error;

/// Errors returned while constructing service domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceDomainError {
    /// The service identifier is empty once the leading `/` is stripped.
    #[error("service identifier must not be empty")]
    EmptyServiceId,

    /// The service name is empty.
    #[error("service name must not be empty")]
    EmptyServiceName,

    /// The service port is zero.
    #[error("service port must be a positive integer")]
    ZeroPort,

    /// The label prefix is empty after trimming.
    #[error("label prefix must not be empty")]
    EmptyLabelPrefix,
}
