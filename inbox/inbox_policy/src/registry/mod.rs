//! Actor type registry.
//!
//! Policies never define actor categories themselves. A registry maps each
//! category name to an `ActorType`, which supplies up to two capabilities:
//! validating a single actor, and producing candidate filters for bulk
//! recipient searches. Either capability may be missing, and the policy
//! treats the two cases differently (single-pair checks fail closed, bulk
//! filters fail open).

mod in_memory;
mod types;

pub use in_memory::InMemoryTypeRegistry;
pub use types::{AttributeActorType, FnActorType, UnregisteredType};

use inbox_core::Actor;
use inbox_query::CandidateClauses;
use std::sync::Arc;

/// Capabilities of one actor category.
pub trait ActorType: Send + Sync {
    /// Check whether `actor` belongs to `category`.
    ///
    /// # Returns
    ///
    /// * `Some(bool)` - The verdict.
    /// * `None` - If this type cannot validate actors.
    fn validate(&self, actor: &Actor, category: &str) -> Option<bool>;

    /// Describe the actors of `category` for a bulk query.
    ///
    /// # Returns
    ///
    /// * `Some(CandidateClauses)` - Joins and predicates selecting the category.
    /// * `None` - If this type cannot produce bulk filters.
    fn candidate_filter(&self, category: &str) -> Option<CandidateClauses>;
}

/// Lookup of actor types by category name.
pub trait TypeRegistry: Send + Sync {
    /// Get the actor type registered under `category`.
    ///
    /// # Returns
    ///
    /// * `Some` - The registered type.
    /// * `None` - If nothing is registered under that name.
    fn lookup(&self, category: &str) -> Option<Arc<dyn ActorType>>;
}
