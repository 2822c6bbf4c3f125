//! Unit tests for the container runtime module.

mod domain_tests;
