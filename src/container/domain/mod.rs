//! Domain model for the container runtime collaborator.
//!
//! Containers are described only by what service derivation and event
//! handling need: identity, name, ordered labels, and port bindings.

mod event;
mod ids;
mod snapshot;

pub use event::{EventSubscription, RuntimeEvent};
pub use ids::ContainerId;
pub use snapshot::{ContainerSnapshot, PortMapping};
