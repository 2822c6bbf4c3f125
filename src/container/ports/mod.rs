//! Port contracts for the container runtime collaborator.

mod runtime;

pub use runtime::{
    ContainerRuntime, ContainerRuntimeError, ContainerRuntimeResult, RuntimeEventStream,
};
