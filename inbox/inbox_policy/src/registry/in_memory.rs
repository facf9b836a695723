//! In-memory actor type registry.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use inbox_core::error::{RegistryError, Result};
use std::sync::Arc;

use super::{ActorType, TypeRegistry};

/// An in-memory actor type registry.
///
/// Clones share the same registrations.
#[derive(Clone, Default)]
pub struct InMemoryTypeRegistry {
    /// The actor types, indexed by category name.
    types: Arc<DashMap<String, Arc<dyn ActorType>>>,
}

impl InMemoryTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor type under a category name.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the type was registered.
    /// * `Err` - If the name is already taken.
    pub fn register(&self, category: impl Into<String>, actor_type: impl ActorType + 'static) -> Result<()> {
        self.register_arc(category, Arc::new(actor_type))
    }

    /// Register a shared actor type under a category name.
    pub fn register_arc(&self, category: impl Into<String>, actor_type: Arc<dyn ActorType>) -> Result<()> {
        let category = category.into();
        match self.types.entry(category) {
            Entry::Occupied(entry) => {
                Err(RegistryError::Conflict(entry.key().clone()).into())
            }
            Entry::Vacant(entry) => {
                tracing::debug!(category = %entry.key(), "registered actor type");
                entry.insert(actor_type);
                Ok(())
            }
        }
    }

    /// Remove the actor type registered under a category name.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the type was removed.
    /// * `Err` - If nothing was registered under that name.
    pub fn unregister(&self, category: &str) -> Result<()> {
        self.types
            .remove(category)
            .map(|_| ())
            .ok_or_else(|| RegistryError::TypeNotFound(category.to_string()).into())
    }

    /// Whether a type is registered under `category`.
    pub fn contains(&self, category: &str) -> bool {
        self.types.contains_key(category)
    }

    /// Registered category names, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl TypeRegistry for InMemoryTypeRegistry {
    fn lookup(&self, category: &str) -> Option<Arc<dyn ActorType>> {
        self.types.get(category).map(|entry| Arc::clone(entry.value()))
    }
}
