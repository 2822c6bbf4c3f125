//! Port contracts for the service registry collaborator.

mod registry;

pub use registry::{
    RegistryOperation, ServiceRegistry, ServiceRegistryError, ServiceRegistryResult,
};
