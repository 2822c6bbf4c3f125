//! Registrar: keeps a service registry in sync with running containers.
//!
//! Containers carrying Traefik-style routing labels are described as
//! services and registered with a Consul agent when they start. When they
//! stop, deregistration is deferred for a grace period so that a quick
//! restart does not churn the registry.
//!
//! # Architecture
//!
//! Registrar follows hexagonal architecture principles:
//!
//! - **Domain**: pure types and the label parser, free of I/O
//! - **Ports**: trait interfaces over the container runtime and the registry
//! - **Adapters**: Docker engine, Consul agent HTTP API, and in-memory
//!   implementations of both ports
//!
//! # Modules
//!
//! - [`container`]: container runtime port, snapshots and events
//! - [`service`]: service descriptions and label derivation
//! - [`registry`]: service registry port and adapters
//! - [`sync`]: startup reconciliation and event-driven updates
//! - [`config`]: command line and environment settings
//! - [`logging`]: tracing subscriber setup
//! - [`app`]: adapter wiring, command dispatch and signal handling

pub mod app;
pub mod config;
pub mod container;
pub mod logging;
pub mod registry;
pub mod service;
pub mod sync;
