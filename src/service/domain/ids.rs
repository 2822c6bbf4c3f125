//! Registry-facing service identifier.

use super::ServiceDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique registry key for one container instance.
///
/// Derived from the container name with a single leading `/` removed, so
/// `/tests-whoami-1` and `tests-whoami-1` map to the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Creates an identifier from a registry key or container name.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceDomainError::EmptyServiceId`] when nothing remains
    /// after stripping the leading `/`.
    pub fn new(value: impl Into<String>) -> Result<Self, ServiceDomainError> {
        let raw = value.into();
        let stripped = raw.strip_prefix('/').unwrap_or(&raw);
        if stripped.is_empty() {
            return Err(ServiceDomainError::EmptyServiceId);
        }
        Ok(Self(stripped.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
