//! Step definitions for registry synchronization scenarios.

pub mod world;

mod given;
mod then;
mod when;
