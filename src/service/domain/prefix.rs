//! Validated routing label prefix.

use super::ServiceDomainError;
use std::fmt;

/// Default routing label namespace.
pub const DEFAULT_LABEL_PREFIX: &str = "traefik";

/// Namespace of routing labels (for example `traefik`).
///
/// The prefix is matched literally against label keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelPrefix(String);

impl LabelPrefix {
    /// Creates a validated prefix. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceDomainError::EmptyLabelPrefix`] when the prefix is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ServiceDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ServiceDomainError::EmptyLabelPrefix);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether a label key belongs to this prefix.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        key.starts_with(self.as_str())
    }
}

impl Default for LabelPrefix {
    fn default() -> Self {
        Self(DEFAULT_LABEL_PREFIX.to_owned())
    }
}

impl fmt::Display for LabelPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
