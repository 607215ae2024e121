// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Method table: which component function serves each (namespace, version, leaf).
//!
//! The table is either read from a JSON file shaped as
//!
//! ```json
//! { "reports.sales": { "2.0": { "reports.sales.summary": { "fun": "C_Reports.summary" } } } }
//! ```
//!
//! or assembled in code with [`MethodTable::builder`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::registry::RegistryError;

/// One declared method binding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerBinding {
    /// Namespace the method is filed under
    pub namespace_key: String,
    /// Version bucket
    pub version: String,
    /// Full method identifier
    pub leaf_key: String,
    /// `<component short name>.<exported function>`
    pub target_function_path: String,
}

impl HandlerBinding {
    /// Splits the target path into component short name and function name.
    pub fn target(&self) -> Option<(&str, &str)> {
        self.target_function_path
            .split_once('.')
            .filter(|(component, function)| !component.is_empty() && !function.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct Leaf {
    fun: String,
}

type TableFile = BTreeMap<String, BTreeMap<String, BTreeMap<String, Leaf>>>;

/// The declared bindings, sorted by namespace, version and leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodTable {
    bindings: Vec<HandlerBinding>,
}

impl MethodTable {
    /// Starts a table in code.
    pub fn builder() -> MethodTableBuilder {
        MethodTableBuilder::default()
    }

    /// Reads a table file. A missing or malformed file is a boot failure.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let failure = |reason: String| RegistryError::MethodTable {
            path: path.to_path_buf(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| failure(e.to_string()))?;
        let file: TableFile = serde_json::from_str(&content).map_err(|e| failure(e.to_string()))?;

        let mut builder = Self::builder();
        for (namespace, versions) in file {
            for (version, leaves) in versions {
                for (leaf, entry) in leaves {
                    builder = builder.bind(&namespace, &version, leaf, entry.fun);
                }
            }
        }
        Ok(builder.build())
    }

    /// Declared bindings.
    pub fn bindings(&self) -> &[HandlerBinding] {
        &self.bindings
    }

    /// Number of declared bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no binding is declared.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Fluent construction of a [`MethodTable`].
#[derive(Debug, Default)]
pub struct MethodTableBuilder {
    bindings: BTreeMap<(String, String, String), String>,
}

impl MethodTableBuilder {
    /// Binds `(namespace, version, leaf)` to a `<component>.<function>` target.
    /// Binding the same triple again replaces the earlier target.
    pub fn bind(
        mut self,
        namespace: impl Into<String>,
        version: impl Into<String>,
        leaf: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.bindings
            .insert((namespace.into(), version.into(), leaf.into()), target.into());
        self
    }

    /// Finishes the table.
    pub fn build(self) -> MethodTable {
        let bindings = self
            .bindings
            .into_iter()
            .map(|((namespace_key, version, leaf_key), target_function_path)| HandlerBinding {
                namespace_key,
                version,
                leaf_key,
                target_function_path,
            })
            .collect();
        MethodTable { bindings }
    }
}
