//! Actor model.
//!
//! An actor is anything that can send or receive a message. The policy only
//! needs the actor's stable identifier plus whatever attributes the
//! configured category validators inspect (an admin flag, a role list, a
//! membership marker), so attributes are kept as loosely typed values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::id::ActorId;
use crate::utils::ConfigValue;

/// A sender or recipient of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// The stable identifier of this actor in the entity store.
    pub id: ActorId,

    /// Attributes consulted by category validators.
    #[serde(default)]
    pub attributes: HashMap<String, ConfigValue>,
}

impl Actor {
    /// Create an actor with no attributes from a raw store identifier.
    pub fn new(id: u64) -> Self {
        Self::from_id(ActorId::new(id))
    }

    /// Create an actor with no attributes.
    pub fn from_id(id: ActorId) -> Self {
        Self {
            id,
            attributes: HashMap::new(),
        }
    }

    /// Set an attribute on this actor.
    ///
    /// # Returns
    ///
    /// The updated actor.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Get an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&ConfigValue> {
        self.attributes.get(name)
    }

    /// Read a boolean attribute, treating a missing or non-boolean value as
    /// `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.attribute(name)
            .and_then(ConfigValue::as_bool)
            .unwrap_or(false)
    }
}
