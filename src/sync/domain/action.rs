//! Classification of runtime lifecycle actions.

use super::SyncDomainError;
use std::collections::BTreeSet;
use std::fmt;

/// Default start-type actions.
pub const DEFAULT_REGISTER_ACTIONS: [&str; 3] = ["start", "restart", "update"];

/// Default stop-type actions.
pub const DEFAULT_DEREGISTER_ACTIONS: [&str; 5] = ["die", "stop", "kill", "destroy", "rename"];

/// What a runtime event means for the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleAction {
    /// The container should become reachable.
    Register,
    /// The container should eventually become unreachable.
    Deregister,
}

impl LifecycleAction {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Deregister => "deregister",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits runtime actions into start-type and stop-type sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventClassifier {
    register_actions: BTreeSet<String>,
    deregister_actions: BTreeSet<String>,
}

impl EventClassifier {
    /// Creates a classifier from two action lists.
    ///
    /// Entries are trimmed and blank entries dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SyncDomainError`] when either list is empty or an action
    /// appears in both.
    pub fn new<R, D>(register_actions: R, deregister_actions: D) -> Result<Self, SyncDomainError>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let register = normalize(register_actions);
        let deregister = normalize(deregister_actions);

        if register.is_empty() {
            return Err(SyncDomainError::EmptyRegisterActions);
        }
        if deregister.is_empty() {
            return Err(SyncDomainError::EmptyDeregisterActions);
        }
        if let Some(shared) = register.intersection(&deregister).next() {
            return Err(SyncDomainError::OverlappingAction(shared.clone()));
        }

        Ok(Self {
            register_actions: register,
            deregister_actions: deregister,
        })
    }

    /// Classifies a runtime action, or returns `None` when it is in
    /// neither list.
    #[must_use]
    pub fn classify(&self, action: &str) -> Option<LifecycleAction> {
        if self.register_actions.contains(action) {
            Some(LifecycleAction::Register)
        } else if self.deregister_actions.contains(action) {
            Some(LifecycleAction::Deregister)
        } else {
            None
        }
    }

    /// Returns every configured action, used as the subscription filter.
    #[must_use]
    pub fn actions(&self) -> Vec<String> {
        self.register_actions
            .iter()
            .chain(&self.deregister_actions)
            .cloned()
            .collect()
    }

    /// Returns the start-type actions.
    pub fn register_actions(&self) -> impl Iterator<Item = &str> {
        self.register_actions.iter().map(String::as_str)
    }

    /// Returns the stop-type actions.
    pub fn deregister_actions(&self) -> impl Iterator<Item = &str> {
        self.deregister_actions.iter().map(String::as_str)
    }
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self {
            register_actions: normalize(DEFAULT_REGISTER_ACTIONS),
            deregister_actions: normalize(DEFAULT_DEREGISTER_ACTIONS),
        }
    }
}

fn normalize<I>(actions: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    actions
        .into_iter()
        .map(|action| action.as_ref().trim().to_owned())
        .filter(|action| !action.is_empty())
        .collect()
}
