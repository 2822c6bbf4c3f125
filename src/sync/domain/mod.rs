//! Domain types for registry synchronization.

mod action;
mod error;
mod plan;
mod settings;

pub use action::{
    DEFAULT_DEREGISTER_ACTIONS, DEFAULT_REGISTER_ACTIONS, EventClassifier, LifecycleAction,
};
pub use error::SyncDomainError;
pub use plan::{ReconcileFailure, ReconcilePlan, ReconcileReport};
pub use settings::{DEFAULT_DEREGISTER_DELAY, SyncSettings};
