//! Policy rule model.
//!
//! A `PolicyRule` is the declarative input to a policy. Every field has a
//! default, so an empty rule allows any actor to message any other actor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named category of actors, or `"all"` for no restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorCategory(String);

impl ActorCategory {
    /// The category name that matches every actor.
    pub const ALL: &'static str = "all";

    /// Create a category.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The unrestricted category.
    pub fn all() -> Self {
        Self(Self::ALL.to_string())
    }

    /// Whether this category places no restriction on actors.
    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }

    /// The category name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ActorCategory {
    fn default() -> Self {
        Self::all()
    }
}

impl From<&str> for ActorCategory {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ActorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rule describing who may message whom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyRule {
    /// Optional identifier, used in logs and by policy sets.
    #[serde(default)]
    pub id: Option<String>,

    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// Category the sender must belong to.
    #[serde(default)]
    pub sender: ActorCategory,

    /// Category the recipient must belong to.
    #[serde(default)]
    pub recipient: ActorCategory,

    /// Relationship that must exist between sender and recipient.
    #[serde(default)]
    pub relationship: Option<String>,

    /// Whether the relationship runs from recipient to sender.
    #[serde(default)]
    pub inverse_relationship: bool,

    /// Relationship through which sender and recipient must share a group.
    #[serde(default)]
    pub group_relationship: Option<String>,
}

impl PolicyRule {
    /// A rule with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rule identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the sender category.
    pub fn with_sender(mut self, category: impl Into<ActorCategory>) -> Self {
        self.sender = category.into();
        self
    }

    /// Set the recipient category.
    pub fn with_recipient(mut self, category: impl Into<ActorCategory>) -> Self {
        self.recipient = category.into();
        self
    }

    /// Require the relationship `sender --name--> recipient`.
    pub fn with_relationship(mut self, name: impl Into<String>) -> Self {
        self.relationship = Some(name.into());
        self.inverse_relationship = false;
        self
    }

    /// Require the relationship `recipient --name--> sender`.
    pub fn with_inverse_relationship(mut self, name: impl Into<String>) -> Self {
        self.relationship = Some(name.into());
        self.inverse_relationship = true;
        self
    }

    /// Require sender and recipient to share a group through `name`.
    pub fn with_group_relationship(mut self, name: impl Into<String>) -> Self {
        self.group_relationship = Some(name.into());
        self
    }

    /// Short label for logs.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{} -> {}", self.sender, self.recipient),
        }
    }
}
