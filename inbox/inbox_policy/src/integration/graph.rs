//! Relationship lookups for pair checks.

use inbox_core::ActorId;
use inbox_query::RelationalStore;

/// Read access to named, directed relationships between entities.
pub trait RelationshipGraph {
    /// Whether `from --name--> to` exists.
    fn has_relationship(&self, from: ActorId, name: &str, to: ActorId) -> bool;

    /// Every `to` such that `from --name--> to` exists.
    fn related(&self, from: ActorId, name: &str) -> Vec<ActorId>;
}

impl RelationshipGraph for RelationalStore {
    fn has_relationship(&self, from: ActorId, name: &str, to: ActorId) -> bool {
        RelationalStore::has_relationship(self, from, name, to)
    }

    fn related(&self, from: ActorId, name: &str) -> Vec<ActorId> {
        RelationalStore::related(self, from, name)
    }
}
