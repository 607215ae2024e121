// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Component definition discovery and name mappings.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::registry::RegistryError;

/// Kinds of components, in boot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    /// Shared business services
    Service,
    /// Method-exporting controllers
    Controller,
    /// Route groups
    Router,
}

impl ComponentKind {
    /// All kinds, in the order they are constructed.
    pub const BOOT_ORDER: [Self; 3] = [Self::Service, Self::Controller, Self::Router];

    /// Lower-case kind name as it appears in definition file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Controller => "controller",
            Self::Router => "router",
        }
    }

    /// File name of this kind's name mapping, e.g. `controller.config.json`.
    pub fn mapping_file(&self) -> String {
        format!("{}.config.json", self.as_str())
    }

    /// Detects the kind from a definition basename such as `render.controller`.
    ///
    /// The first segment is the component's own name and never counts as a kind.
    pub fn detect(basename: &str) -> Option<Self> {
        basename.split('.').skip(1).find_map(|segment| match segment {
            "service" => Some(Self::Service),
            "controller" => Some(Self::Controller),
            "router" => Some(Self::Router),
            _ => None,
        })
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A component definition file found under the component root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// Detected kind
    pub kind: ComponentKind,
    /// File name without its final extension
    pub basename: String,
    /// Full path of the file
    pub path: PathBuf,
}

/// Recursively walks `root` and returns every file that names a component kind.
///
/// Files without a kind segment are ignored. The order of the result follows the
/// filesystem and carries no meaning.
pub fn discover(root: &Path) -> Result<Vec<Definition>, RegistryError> {
    let mut definitions = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| RegistryError::Walk {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(basename) = entry
            .path()
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
        else {
            continue;
        };

        if let Some(kind) = ComponentKind::detect(&basename) {
            tracing::trace!(kind = %kind, basename = %basename, path = %entry.path().display(), "Found component definition");
            definitions.push(Definition {
                kind,
                basename,
                path: entry.into_path(),
            });
        }
    }

    Ok(definitions)
}

/// Loads the short name to basename mapping for `kind` from `mapping_dir`.
///
/// Keys come back sorted, which fixes the registration order.
pub fn load_mapping(
    mapping_dir: &Path,
    kind: ComponentKind,
) -> Result<BTreeMap<String, String>, RegistryError> {
    let path = mapping_dir.join(kind.mapping_file());
    let content = fs::read_to_string(&path).map_err(|source| RegistryError::MappingUnreadable {
        kind: kind.as_str(),
        path: path.clone(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| RegistryError::MappingMalformed { path, source })
}
