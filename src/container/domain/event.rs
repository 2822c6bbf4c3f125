//! Container lifecycle events and subscription parameters.

use super::ContainerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lifecycle event reported by the container runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeEvent {
    container_id: ContainerId,
    action: String,
    container_name: String,
    time: Option<DateTime<Utc>>,
}

impl RuntimeEvent {
    /// Creates an event for a container action.
    #[must_use]
    pub fn new(
        container_id: ContainerId,
        action: impl Into<String>,
        container_name: impl Into<String>,
    ) -> Self {
        Self {
            container_id,
            action: action.into(),
            container_name: container_name.into(),
            time: None,
        }
    }

    /// Sets the time the runtime recorded for the event.
    #[must_use]
    pub const fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Returns the container identifier.
    #[must_use]
    pub const fn container_id(&self) -> &ContainerId {
        &self.container_id
    }

    /// Returns the raw runtime action (for example `start` or `die`).
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the container name from the event attributes.
    #[must_use]
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// Returns the event time, when the runtime supplied one.
    #[must_use]
    pub const fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }
}

/// Parameters for opening a runtime event subscription.
///
/// The runtime replays matching events recorded at or after `since`, so a
/// subscription opened with a timestamp taken before a snapshot observes
/// every event that happens while the snapshot is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSubscription {
    since: DateTime<Utc>,
    actions: Vec<String>,
}

impl EventSubscription {
    /// Creates a subscription for container events with the given actions.
    #[must_use]
    pub fn new(since: DateTime<Utc>, actions: impl IntoIterator<Item = String>) -> Self {
        Self {
            since,
            actions: actions.into_iter().collect(),
        }
    }

    /// Returns the replay start timestamp.
    #[must_use]
    pub const fn since(&self) -> DateTime<Utc> {
        self.since
    }

    /// Returns the action allow-list.
    #[must_use]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }
}
