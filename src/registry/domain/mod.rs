//! Domain model for the service registry collaborator.

mod registered;

pub use registered::{CONNECT_PROXY_KIND, RegisteredService, RegisteredServiceSet};
