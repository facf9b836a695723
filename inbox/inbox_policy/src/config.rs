//! Configuration.
//!
//! An `InboxConfig` describes a complete messaging setup in TOML: the
//! store's schema, how bound parameters are written, attribute-based actor
//! types and the policy rules themselves.
//!
//! ```toml
//! log_level = "debug"
//! placeholder = "dollar"
//!
//! [store]
//! table_prefix = "elgg_"
//!
//! [actor_types.staff]
//! attribute = "is_staff"
//! value = true
//!
//! [[policies]]
//! id = "friends"
//! relationship = "friend"
//! ```

use inbox_core::error::{ConfigError, Result};
use inbox_core::utils::{init_logging, LogLevel};
use inbox_query::{DefaultSanitizer, Placeholder, SqlRenderer, SqlValue, StoreSchema};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

use crate::engine::{Policy, PolicySet};
use crate::model::{ActorCategory, PolicyRule};
use crate::registry::{AttributeActorType, InMemoryTypeRegistry, TypeRegistry};

/// A messaging policy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InboxConfig {
    /// Minimum level of emitted log events.
    pub log_level: LogLevel,

    /// Placeholder style for rendered filters.
    pub placeholder: Placeholder,

    /// Table and column names of the store.
    pub store: StoreSchema,

    /// Attribute-based actor types, by category name.
    pub actor_types: BTreeMap<String, AttributeActorType>,

    /// Policy rules, in evaluation order.
    pub policies: Vec<PolicyRule>,
}

impl InboxConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Arguments
    ///
    /// * `source` - The document.
    ///
    /// # Returns
    ///
    /// * `Ok(InboxConfig)` - The configuration.
    /// * `Err` - If the document cannot be parsed or is invalid.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the file.
    ///
    /// # Returns
    ///
    /// * `Ok(InboxConfig)` - The configuration.
    /// * `Err` - If the file cannot be read, parsed or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        info!(
            path = %path.display(),
            actor_types = config.actor_types.len(),
            policies = config.policies.len(),
            "loaded inbox configuration"
        );
        Ok(config)
    }

    /// Check the configuration for inconsistencies.
    ///
    /// The store schema must be valid and rule ids must be unique. Actor
    /// types need a non-blank name other than `"all"` and a scalar value.
    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;

        for (name, actor_type) in &self.actor_types {
            if SqlValue::from_config(&actor_type.value).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "actor type {:?} compares against {}, which is not a scalar",
                    name, actor_type.value
                ))
                .into());
            }
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("actor type name is empty".to_string()).into());
            }
            if name == ActorCategory::ALL {
                return Err(ConfigError::Invalid(format!(
                    "actor type name {:?} is reserved",
                    ActorCategory::ALL
                ))
                .into());
            }
        }

        let mut ids = HashSet::new();
        for id in self.policies.iter().filter_map(|rule| rule.id.as_deref()) {
            if !ids.insert(id) {
                return Err(ConfigError::Invalid(format!("duplicate policy id {:?}", id)).into());
            }
        }

        Ok(())
    }

    /// Install the global tracing subscriber at the configured level.
    pub fn init_logging(&self) -> Result<()> {
        init_logging(self.log_level)
    }

    /// A registry holding the configured actor types.
    ///
    /// Actor type filters refer to the entity table under the store's
    /// entity alias.
    pub fn build_registry(&self) -> Result<InMemoryTypeRegistry> {
        let registry = InMemoryTypeRegistry::new();
        for (name, actor_type) in &self.actor_types {
            let actor_type = actor_type
                .clone()
                .with_entity_alias(self.store.entity_alias.clone());
            registry.register(name.clone(), actor_type)?;
        }
        Ok(registry)
    }

    /// Resolve the configured rules against `registry`.
    ///
    /// # Arguments
    ///
    /// * `registry` - Where rule categories are looked up.
    ///
    /// # Returns
    ///
    /// * `Ok(PolicySet)` - The policies, in configuration order.
    /// * `Err` - If a rule's relationship names cannot be sanitized.
    pub fn build_policies(&self, registry: &dyn TypeRegistry) -> Result<PolicySet> {
        self.policies
            .iter()
            .map(|rule| {
                Policy::with_store(
                    rule.clone(),
                    registry,
                    &DefaultSanitizer,
                    self.store.clone(),
                )
            })
            .collect()
    }

    /// A renderer for the configured store and placeholder style.
    pub fn renderer(&self) -> Result<SqlRenderer> {
        SqlRenderer::new(self.store.clone(), self.placeholder)
    }
}
