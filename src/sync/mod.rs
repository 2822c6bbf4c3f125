//! Registry synchronization.
//!
//! Brings the registry in line with running containers at startup, then
//! follows the runtime event stream for the rest of the process lifetime.
//! Deregistration is debounced so a quick stop/start cycle does not churn
//! the registry.
//!
//! - Domain types in [`domain`]
//! - Orchestration services in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
