//! Component repository: name-keyed factories for pluggable capabilities.
//!
//! Factories are grouped by capability (the trait object they produce, e.g.
//! `dyn Storage`) and keyed by component kind within it, so "files" can mean
//! one thing for storages and another for some future capability.
//!
//! # Access pattern
//!
//! Single writer, then many readers. [`ComponentRepository::register`] takes
//! `&mut self` and is only called while the owning context is being set up:
//! built-ins during construction, plugins during the loading phase that
//! follows. After that the repository is shared and only
//! [`ComponentRepository::create`] (`&self`) runs, from any number of threads.
//! There is no internal lock; the borrow checker rules out a `register`
//! racing a `create`.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tenantry_core::plugin::PluginConfig;
use tenantry_core::storage::Storage;
use tenantry_core::{Result, UnknownComponentError};
use tracing::debug;

/// A trait object type that components can be created as.
pub trait Capability: 'static {
    /// Human-readable capability name, used in errors and logs.
    const NAME: &'static str;
}

impl Capability for dyn Storage {
    const NAME: &'static str = "storage";
}

/// Factory producing one capability instance from its configuration.
pub type Factory<C> = Arc<dyn Fn(&PluginConfig) -> Result<Arc<C>> + Send + Sync>;

type ErasedFactory = Box<dyn Any + Send + Sync>;

/// Registry of component factories.
#[derive(Default)]
pub struct ComponentRepository {
    factories: HashMap<TypeId, HashMap<String, ErasedFactory>>,
}

impl ComponentRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` as the implementation of `kind` for capability `C`.
    ///
    /// Registering a kind again replaces the previous factory, which is how
    /// plugins shadow built-ins.
    pub fn register<C, F>(&mut self, kind: impl Into<String>, factory: F)
    where
        C: Capability + ?Sized,
        F: Fn(&PluginConfig) -> Result<Arc<C>> + Send + Sync + 'static,
    {
        let kind = kind.into();
        let factory: Factory<C> = Arc::new(factory);
        let replaced = self
            .factories
            .entry(TypeId::of::<C>())
            .or_default()
            .insert(kind.clone(), Box::new(factory))
            .is_some();
        debug!(capability = C::NAME, kind = %kind, replaced, "Registered component");
    }

    /// Instantiate `kind` as capability `C`.
    pub fn create<C>(&self, kind: &str, config: &PluginConfig) -> Result<Arc<C>>
    where
        C: Capability + ?Sized,
    {
        let factory = self
            .factories
            .get(&TypeId::of::<C>())
            .and_then(|kinds| kinds.get(kind))
            .and_then(|erased| erased.downcast_ref::<Factory<C>>())
            .ok_or_else(|| UnknownComponentError {
                capability: C::NAME,
                kind: kind.to_string(),
            })?;

        debug!(capability = C::NAME, kind, name = %config.name, "Creating component");
        factory(config)
    }

    /// Whether `kind` is registered for capability `C`.
    pub fn contains<C>(&self, kind: &str) -> bool
    where
        C: Capability + ?Sized,
    {
        self.factories
            .get(&TypeId::of::<C>())
            .is_some_and(|kinds| kinds.contains_key(kind))
    }

    /// Registered kinds for capability `C`, sorted.
    pub fn kinds<C>(&self) -> Vec<&str>
    where
        C: Capability + ?Sized,
    {
        let mut kinds: Vec<&str> = self
            .factories
            .get(&TypeId::of::<C>())
            .map(|kinds| kinds.keys().map(String::as_str).collect())
            .unwrap_or_default();
        kinds.sort_unstable();
        kinds
    }

    /// Register a storage backend factory.
    pub fn register_storage<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&PluginConfig) -> Result<Arc<dyn Storage>> + Send + Sync + 'static,
    {
        self.register::<dyn Storage, F>(kind, factory);
    }

    /// Instantiate a storage backend.
    pub fn create_storage(&self, kind: &str, config: &PluginConfig) -> Result<Arc<dyn Storage>> {
        self.create::<dyn Storage>(kind, config)
    }
}
