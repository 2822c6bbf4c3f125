//! Unit tests for service descriptions and label derivation.

mod domain_tests;
