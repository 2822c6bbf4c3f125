//! Runtime settings shared by the reconciler and the event processor.

use super::{EventClassifier, SyncDomainError};
use crate::service::domain::LabelPrefix;
use std::time::Duration;

/// Default grace period before a stopped container is deregistered.
pub const DEFAULT_DEREGISTER_DELAY: Duration = Duration::from_millis(5000);

/// Validated synchronizer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    prefix: LabelPrefix,
    classifier: EventClassifier,
    deregister_delay: Duration,
}

impl SyncSettings {
    /// Creates settings.
    ///
    /// # Errors
    ///
    /// Returns [`SyncDomainError::ZeroDeregisterDelay`] when the grace
    /// period is zero.
    pub fn new(
        prefix: LabelPrefix,
        classifier: EventClassifier,
        deregister_delay: Duration,
    ) -> Result<Self, SyncDomainError> {
        if deregister_delay.is_zero() {
            return Err(SyncDomainError::ZeroDeregisterDelay);
        }
        Ok(Self {
            prefix,
            classifier,
            deregister_delay,
        })
    }

    /// Returns the label prefix.
    #[must_use]
    pub const fn prefix(&self) -> &LabelPrefix {
        &self.prefix
    }

    /// Returns the event classifier.
    #[must_use]
    pub const fn classifier(&self) -> &EventClassifier {
        &self.classifier
    }

    /// Returns the deregistration grace period.
    #[must_use]
    pub const fn deregister_delay(&self) -> Duration {
        self.deregister_delay
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            prefix: LabelPrefix::default(),
            classifier: EventClassifier::default(),
            deregister_delay: DEFAULT_DEREGISTER_DELAY,
        }
    }
}
