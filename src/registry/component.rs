// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Live components, the tree that owns them, and their compiled-in factories.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use fnv::FnvHashMap;

use super::discovery::ComponentKind;
use super::table::MethodTable;
use crate::error::registry::RegistryError;
use crate::protocol::handler::MethodHandlerFn;

/// A component instance living for the whole process.
pub trait Component: Send + Sync + 'static {
    /// Functions this component makes available as method targets.
    fn exports(self: Arc<Self>) -> Vec<(&'static str, MethodHandlerFn)> {
        Vec::new()
    }

    /// Upcast used for typed lookups through [`ComponentTree`].
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Component instances by kind and short name.
#[derive(Clone, Default)]
pub struct ComponentTree {
    kinds: BTreeMap<ComponentKind, BTreeMap<String, Arc<dyn Component>>>,
}

impl ComponentTree {
    /// Attaches a component under `name`. Returns `false`, leaving the tree
    /// unchanged, when the name is already taken for that kind.
    pub fn insert(&mut self, kind: ComponentKind, name: impl Into<String>, component: Arc<dyn Component>) -> bool {
        let slot = self.kinds.entry(kind).or_default();
        let name = name.into();
        if slot.contains_key(&name) {
            return false;
        }
        slot.insert(name, component);
        true
    }

    /// Looks up a component.
    pub fn get(&self, kind: ComponentKind, name: &str) -> Option<&Arc<dyn Component>> {
        self.kinds.get(&kind).and_then(|slot| slot.get(name))
    }

    /// Short names registered for `kind`, sorted.
    pub fn names(&self, kind: ComponentKind) -> Vec<&str> {
        self.kinds
            .get(&kind)
            .map(|slot| slot.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Components of `kind`, sorted by short name.
    pub fn iter(&self, kind: ComponentKind) -> impl Iterator<Item = (&str, &Arc<dyn Component>)> {
        self.kinds
            .get(&kind)
            .into_iter()
            .flat_map(|slot| slot.iter().map(|(name, component)| (name.as_str(), component)))
    }

    /// Total number of components.
    pub fn len(&self) -> usize {
        self.kinds.values().map(BTreeMap::len).sum()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed access to a registered service.
    pub fn service<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.get(ComponentKind::Service, name)
            .cloned()
            .and_then(|component| component.into_any().downcast::<T>().ok())
    }

    /// Like [`ComponentTree::service`], failing with a registry error on behalf of
    /// `component` when the service is absent or of another type.
    pub fn require_service<T: Send + Sync + 'static>(
        &self,
        component: &str,
        name: &str,
    ) -> Result<Arc<T>, RegistryError> {
        self.service(name).ok_or_else(|| RegistryError::MissingDependency {
            component: component.to_string(),
            dependency: name.to_string(),
        })
    }
}

impl fmt::Debug for ComponentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (kind, slot) in &self.kinds {
            map.entry(kind, &slot.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}

/// What a factory sees while its component is being constructed.
#[derive(Debug, Clone, Copy)]
pub struct FactoryContext<'a> {
    /// Short name the component is being registered under
    pub name: &'a str,
    /// Components constructed so far
    pub components: &'a ComponentTree,
    /// Declared method bindings
    pub methods: &'a MethodTable,
}

/// Constructor of one component definition.
pub type ComponentFactory =
    Box<dyn Fn(&FactoryContext<'_>) -> Result<Arc<dyn Component>, RegistryError> + Send + Sync>;

/// Compiled-in constructors keyed by definition basename.
#[derive(Default)]
pub struct ComponentFactories {
    factories: FnvHashMap<String, ComponentFactory>,
}

impl ComponentFactories {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor for definitions with this basename.
    pub fn register<F>(mut self, basename: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&FactoryContext<'_>) -> Result<Arc<dyn Component>, RegistryError> + Send + Sync + 'static,
    {
        self.factories.insert(basename.into(), Box::new(factory));
        self
    }

    /// Constructor for `basename`.
    pub fn get(&self, basename: &str) -> Option<&ComponentFactory> {
        self.factories.get(basename)
    }

    /// Whether a constructor exists for `basename`.
    pub fn contains(&self, basename: &str) -> bool {
        self.factories.contains_key(basename)
    }
}

impl fmt::Debug for ComponentFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ComponentFactories")
            .field("definitions", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);

    impl Component for Counter {
        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    struct Other;

    impl Component for Other {
        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[test]
    fn test_insert_once_per_name() {
        let mut tree = ComponentTree::default();
        assert!(tree.insert(ComponentKind::Service, "S_Count", Arc::new(Counter(1))));
        assert!(!tree.insert(ComponentKind::Service, "S_Count", Arc::new(Counter(2))));
        assert!(tree.insert(ComponentKind::Controller, "S_Count", Arc::new(Other)));

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.service::<Counter>("S_Count").unwrap().0, 1);
    }

    #[test]
    fn test_typed_service_lookup() {
        let mut tree = ComponentTree::default();
        tree.insert(ComponentKind::Service, "S_Other", Arc::new(Other));

        assert!(tree.service::<Counter>("S_Other").is_none());
        assert!(matches!(
            tree.require_service::<Counter>("C_Thing", "S_Missing"),
            Err(RegistryError::MissingDependency { .. })
        ));
        assert!(tree.require_service::<Other>("C_Thing", "S_Other").is_ok());
    }

    #[test]
    fn test_names_sorted() {
        let mut tree = ComponentTree::default();
        tree.insert(ComponentKind::Controller, "C_b", Arc::new(Other));
        tree.insert(ComponentKind::Controller, "C_a", Arc::new(Other));
        assert_eq!(tree.names(ComponentKind::Controller), vec!["C_a", "C_b"]);
        assert!(tree.names(ComponentKind::Router).is_empty());
    }
}
