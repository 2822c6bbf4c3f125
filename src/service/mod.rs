//! Service descriptions and the routing-label parser that derives them.
//!
//! A container is routable when it carries labels under the configured
//! prefix (`traefik` by default) and has a port the registry can point at.
//! [`derive_service`] turns one inspection snapshot into at most one
//! [`domain::ServiceDescription`].

pub mod domain;
mod labels;

pub use labels::derive_service;

#[cfg(test)]
mod tests;
