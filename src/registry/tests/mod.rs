//! Unit tests for the service registry module.

mod domain_tests;
mod memory_tests;
