//! Test utilities and fixtures for the Lanai REST gateway.
//!
//! This module provides reusable fixtures (temporary config files, on-disk
//! component trees) and proptest strategies for protocol fields.

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::registry::RegistryConfig;

/// Create a temporary directory for test files.
pub fn create_test_dir() -> std::io::Result<TempDir> {
    tempfile::tempdir()
}

/// Strategy for dotted method identifiers of one to four segments.
pub fn method_identifier_strategy() -> BoxedStrategy<String> {
    proptest::collection::vec("[a-z][a-z0-9_]{0,7}", 1..=4)
        .prop_map(|segments| segments.join("."))
        .boxed()
}

/// Strategy for `major.minor` version strings.
pub fn version_strategy() -> BoxedStrategy<String> {
    (0u8..10, 0u8..10)
        .prop_map(|(major, minor)| format!("{major}.{minor}"))
        .boxed()
}

/// Test fixture for tests touching files or environment variables.
///
/// Environment variables set through the fixture are removed when it is dropped.
pub struct TestFixture {
    /// Temporary directory for test files
    pub temp_dir: TempDir,
    /// Vector of environment variables to cleanup after tests
    env_vars: Vec<String>,
}

impl TestFixture {
    /// Create a new test fixture.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            temp_dir: create_test_dir()?,
            env_vars: Vec::new(),
        })
    }

    /// Set an environment variable for this test.
    pub fn set_env<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key_str = key.into();
        std::env::set_var(&key_str, value.into());
        self.env_vars.push(key_str);
    }

    /// Write a file with the given name into the fixture directory.
    pub fn write_file<C: AsRef<[u8]>>(&self, name: &str, contents: C) -> std::io::Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}

impl Drop for TestFixture {
    fn drop(&mut self) {
        for key in &self.env_vars {
            std::env::remove_var(key);
        }
    }
}

/// An on-disk component tree with its mapping directory.
pub struct RegistryFixture {
    dir: TempDir,
}

impl RegistryFixture {
    /// Creates an empty tree.
    pub fn new() -> std::io::Result<Self> {
        let dir = create_test_dir()?;
        fs::create_dir_all(dir.path().join("components"))?;
        fs::create_dir_all(dir.path().join("mapping"))?;
        Ok(Self { dir })
    }

    /// Root of the fixture.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Adds an empty definition file at `relative` under the component root.
    pub fn definition(self, relative: &str) -> std::io::Result<Self> {
        let path = self.dir.path().join("components").join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, "")?;
        Ok(self)
    }

    /// Writes `<file>` into the mapping directory.
    pub fn mapping(self, file: &str, json: &str) -> std::io::Result<Self> {
        fs::write(self.dir.path().join("mapping").join(file), json)?;
        Ok(self)
    }

    /// Registry configuration pointing at this fixture.
    pub fn config(&self) -> RegistryConfig {
        RegistryConfig {
            component_root: self.dir.path().join("components"),
            mapping_dir: self.dir.path().join("mapping"),
            ..RegistryConfig::default()
        }
    }
}
