//! Adapter implementations of the service registry port.

mod consul;
mod memory;

pub use consul::{ConsulConfig, ConsulRegistry, DEFAULT_CONSUL_ADDR};
pub use memory::{InMemoryServiceRegistry, RegistryCall};
