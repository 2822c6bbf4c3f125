//! Unit tests for the registry synchronization module.

mod synchronizer_tests;
