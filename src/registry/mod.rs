//! Service registry collaborator.
//!
//! The registry holds one entry per running, labelled container. This
//! module defines the port the synchronizer talks to, a snapshot model of
//! registry content, and two adapters: the Consul agent HTTP API and an
//! in-memory registry used by tests.
//!
//! Entries whose kind is `connect-proxy` are sidecars owned by the registry
//! itself. They are reported by [`ports::ServiceRegistry::list_registered`]
//! but never diffed against live containers.

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
