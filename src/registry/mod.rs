// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Boot-time component registry.
//!
//! [`build`] walks the component definition tree, matches each discovered
//! definition against its kind's name mapping, constructs the matching components
//! through compiled-in factories and finally binds the method table against the
//! controllers' exported functions. The result is an immutable [`RegistryIndex`]
//! shared by every request.
//!
//! Registration order is the sorted order of mapping keys, per kind, with services
//! constructed before controllers and controllers before routers. Filesystem order
//! never influences the result.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

pub mod component;
pub mod discovery;
pub mod index;
pub mod table;

pub use component::{Component, ComponentFactories, ComponentFactory, ComponentTree, FactoryContext};
pub use discovery::{ComponentKind, Definition};
pub use index::{BoundMethod, RegistryIndex};
pub use table::{HandlerBinding, MethodTable, MethodTableBuilder};

use crate::config::registry::RegistryConfig;
use crate::error::registry::RegistryError;

/// Builds the registry with the method table file named by `config`.
pub fn build(config: &RegistryConfig, factories: &ComponentFactories) -> Result<RegistryIndex, RegistryError> {
    let table = MethodTable::load(&config.mapping_dir.join(&config.method_table))?;
    build_with_table(config, factories, &table)
}

/// Builds the registry with a method table assembled in code.
pub fn build_with_table(
    config: &RegistryConfig,
    factories: &ComponentFactories,
    table: &MethodTable,
) -> Result<RegistryIndex, RegistryError> {
    let started = Instant::now();
    tracing::debug!(root = %config.component_root.display(), "Building component registry");

    let mut discovered: BTreeMap<ComponentKind, BTreeSet<String>> = BTreeMap::new();
    for definition in discovery::discover(&config.component_root)? {
        discovered
            .entry(definition.kind)
            .or_default()
            .insert(definition.basename);
    }

    let mut components = ComponentTree::default();
    for (kind, basenames) in &discovered {
        let mapping = discovery::load_mapping(&config.mapping_dir, *kind)?;
        let mut matched = BTreeSet::new();

        for (name, basename) in &mapping {
            if !basenames.contains(basename) {
                continue;
            }
            let factory = factories
                .get(basename)
                .ok_or_else(|| RegistryError::UnknownComponent(basename.clone()))?;
            let component = factory(&FactoryContext {
                name,
                components: &components,
                methods: table,
            })?;

            components.insert(*kind, name.clone(), component);
            matched.insert(basename);
            tracing::debug!(kind = %kind, name = %name, definition = %basename, "Registered component");
        }

        for basename in basenames.iter().filter(|b| !matched.contains(b)) {
            tracing::debug!(kind = %kind, definition = %basename, "No mapping entry, definition skipped");
        }
    }

    let index = RegistryIndex::bind(components, table);
    tracing::info!(
        components = index.components().len(),
        methods = index.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Component registry built"
    );
    Ok(index)
}
