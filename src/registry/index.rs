// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The read-only lookup structure queried on every request.

use std::fmt;

use fnv::FnvHashMap;

use super::component::ComponentTree;
use super::discovery::ComponentKind;
use super::table::{HandlerBinding, MethodTable};
use crate::protocol::handler::MethodHandlerFn;

/// A binding whose target resolved to a live handler.
#[derive(Clone)]
pub struct BoundMethod {
    /// Declared binding
    pub binding: HandlerBinding,
    /// Handler exported by the target component
    pub handler: MethodHandlerFn,
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

type Leaves = FnvHashMap<String, BoundMethod>;
type Versions = FnvHashMap<String, Leaves>;

/// Namespace, version and leaf lookup over bound methods.
#[derive(Debug, Default)]
pub struct RegistryIndex {
    namespaces: FnvHashMap<String, Versions>,
    bindings: Vec<HandlerBinding>,
    components: ComponentTree,
}

impl RegistryIndex {
    /// Resolves every declared binding against the controllers of `components`.
    ///
    /// Bindings whose target component or function does not exist are skipped with
    /// a warning; requests for them resolve as unknown methods.
    pub fn bind(components: ComponentTree, table: &MethodTable) -> Self {
        let exports: FnvHashMap<String, FnvHashMap<&'static str, MethodHandlerFn>> = components
            .iter(ComponentKind::Controller)
            .map(|(name, component)| {
                (name.to_string(), component.clone().exports().into_iter().collect())
            })
            .collect();

        let mut namespaces: FnvHashMap<String, Versions> = FnvHashMap::default();
        let mut bindings = Vec::with_capacity(table.len());

        for binding in table.bindings() {
            let handler = binding
                .target()
                .and_then(|(component, function)| exports.get(component)?.get(function));
            let Some(handler) = handler else {
                tracing::warn!(
                    method = %binding.leaf_key,
                    version = %binding.version,
                    target = %binding.target_function_path,
                    "Method target not found, binding skipped"
                );
                continue;
            };

            namespaces
                .entry(binding.namespace_key.clone())
                .or_default()
                .entry(binding.version.clone())
                .or_default()
                .insert(
                    binding.leaf_key.clone(),
                    BoundMethod {
                        binding: binding.clone(),
                        handler: handler.clone(),
                    },
                );
            bindings.push(binding.clone());
        }

        Self {
            namespaces,
            bindings,
            components,
        }
    }

    /// Whether any method is bound under `namespace`.
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// Looks up a bound method. Any missing level yields `None`.
    pub fn lookup(&self, namespace: &str, version: &str, leaf: &str) -> Option<&BoundMethod> {
        self.namespaces.get(namespace)?.get(version)?.get(leaf)
    }

    /// Bound bindings, sorted by namespace, version and leaf.
    pub fn bindings(&self) -> &[HandlerBinding] {
        &self.bindings
    }

    /// The component tree the handlers were taken from.
    pub fn components(&self) -> &ComponentTree {
        &self.components
    }

    /// Number of bound methods.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
