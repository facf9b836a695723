//! Category bindings.
//!
//! A binding pairs a category from the rule with the actor type the
//! registry holds for it. Bindings are resolved once, when a policy is
//! built; unknown categories bind to `UnregisteredType` rather than failing.

use inbox_core::Actor;
use inbox_query::FilterFragment;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

use crate::model::ActorCategory;
use crate::registry::{ActorType, TypeRegistry, UnregisteredType};

/// A category and the capabilities registered for it.
#[derive(Clone)]
pub struct CategoryBinding {
    category: ActorCategory,
    actor_type: Arc<dyn ActorType>,
    registered: bool,
}

impl CategoryBinding {
    /// Resolve `category` against the registry.
    pub fn resolve(category: ActorCategory, registry: &dyn TypeRegistry) -> Self {
        match registry.lookup(category.as_str()) {
            Some(actor_type) => Self {
                category,
                actor_type,
                registered: true,
            },
            None => {
                if !category.is_all() {
                    warn!(category = %category, "actor category is not registered");
                }
                Self {
                    category,
                    actor_type: Arc::new(UnregisteredType),
                    registered: false,
                }
            }
        }
    }

    /// The bound category.
    pub fn category(&self) -> &ActorCategory {
        &self.category
    }

    /// Whether the registry knew the category.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Check whether `actor` belongs to the category.
    ///
    /// `"all"` admits everyone; a category without a validator admits
    /// no one.
    pub fn validate(&self, actor: &Actor) -> bool {
        if self.category.is_all() {
            return true;
        }

        let verdict = self
            .actor_type
            .validate(actor, self.category.as_str())
            .unwrap_or(false);
        trace!(category = %self.category, actor = %actor.id, verdict, "validated actor type");
        verdict
    }

    /// Bulk filter selecting the category.
    ///
    /// `"all"` and a category without a getter both yield the empty
    /// fragment: a missing getter cannot narrow the search.
    pub fn candidate_clauses(&self) -> FilterFragment {
        if self.category.is_all() {
            return FilterFragment::empty();
        }

        match self.actor_type.candidate_filter(self.category.as_str()) {
            Some(clauses) => clauses.into_fragment(),
            None => FilterFragment::empty(),
        }
    }
}

impl fmt::Debug for CategoryBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryBinding")
            .field("category", &self.category)
            .field("registered", &self.registered)
            .finish()
    }
}
