//! Adapter implementations for the container runtime port.

mod docker;
mod memory;

pub use docker::{DockerRuntime, snapshot_from_inspect};
pub use memory::InMemoryContainerRuntime;
