//! Test modules for the Lanai REST gateway.
//!
//! This module contains the cross-cutting test infrastructure:
//! - Configuration loading and validation tests
//! - Error type and reporting tests
//! - Property-based tests of the request pipeline
//! - Test fixtures and utilities
//!
//! Unit tests of individual components live next to the code they test.

pub mod config_tests;
pub mod test_utils;

// Re-export commonly used testing tools to simplify imports in test modules
pub use test_utils::{method_identifier_strategy, version_strategy, RegistryFixture, TestFixture};
