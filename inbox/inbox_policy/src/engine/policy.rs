//! Messaging policy.
//!
//! A `Policy` is a `PolicyRule` resolved against an actor type registry. It
//! encodes one rule two ways:
//!
//! - as boolean checks for a concrete sender and recipient, and
//! - as filter fragments that select every allowed recipient of a sender
//!   when spliced into a query over the entity table.
//!
//! The policy itself is immutable. Fragment generators that join the
//! relationship table take an `AliasAllocator` and draw exactly one alias
//! from it per call that emits a constraint; calls that emit nothing leave
//! the allocator untouched.

use inbox_core::error::{PolicyError, Result};
use inbox_core::{Actor, ActorId};
use inbox_query::alias::{GROUP_RELATIONSHIP_PREFIX, RELATIONSHIP_PREFIX};
use inbox_query::{
    AliasAllocator, Column, DefaultSanitizer, FilterFragment, Ident, Join, Predicate, Sanitizer,
    SqlValue, StoreSchema,
};
use tracing::debug;

use crate::integration::RelationshipGraph;
use crate::model::{ActorCategory, CategoryBinding, PolicyRule};
use crate::registry::TypeRegistry;

/// A rule resolved into validators and fragment generators.
#[derive(Debug, Clone)]
pub struct Policy {
    id: Option<String>,
    sender: CategoryBinding,
    recipient: CategoryBinding,
    relationship: Option<String>,
    inverse_relationship: bool,
    group_relationship: Option<String>,
    schema: StoreSchema,
}

impl Policy {
    /// Build a policy for the default store schema.
    ///
    /// # Arguments
    ///
    /// * `rule` - The rule description.
    /// * `registry` - Where the sender and recipient categories are looked up.
    ///
    /// # Returns
    ///
    /// * `Ok(Policy)` - The policy.
    /// * `Err` - If a relationship name cannot be sanitized.
    pub fn new(rule: PolicyRule, registry: &dyn TypeRegistry) -> Result<Self> {
        Self::with_store(rule, registry, &DefaultSanitizer, StoreSchema::default())
    }

    /// Build a policy for a specific store.
    ///
    /// Unknown categories are not an error: they bind to a type without
    /// capabilities. Relationship names pass through `sanitizer`; a name
    /// that is absent, blank or `"all"` places no constraint.
    ///
    /// # Arguments
    ///
    /// * `rule` - The rule description.
    /// * `registry` - Where the sender and recipient categories are looked up.
    /// * `sanitizer` - The store's literal sanitizer.
    /// * `schema` - Table and column names fragments refer to.
    ///
    /// # Returns
    ///
    /// * `Ok(Policy)` - The policy.
    /// * `Err` - If a relationship name cannot be sanitized or the schema is invalid.
    pub fn with_store(
        rule: PolicyRule,
        registry: &dyn TypeRegistry,
        sanitizer: &dyn Sanitizer,
        schema: StoreSchema,
    ) -> Result<Self> {
        schema.validate()?;

        let relationship = sanitize_relationship("relationship", rule.relationship, sanitizer)?;
        let group_relationship =
            sanitize_relationship("group_relationship", rule.group_relationship, sanitizer)?;

        let policy = Self {
            id: rule.id,
            sender: CategoryBinding::resolve(rule.sender, registry),
            recipient: CategoryBinding::resolve(rule.recipient, registry),
            relationship,
            inverse_relationship: rule.inverse_relationship,
            group_relationship,
            schema,
        };
        debug!(
            policy = ?policy.id,
            sender = %policy.sender.category(),
            recipient = %policy.recipient.category(),
            unresolved = ?policy.unresolved_types(),
            "built policy"
        );
        Ok(policy)
    }

    /// Categories the registry did not know when the policy was built.
    ///
    /// An unresolved side admits no one, so a non-empty result means the
    /// policy can never permit a message.
    pub fn unresolved_types(&self) -> Vec<&ActorCategory> {
        [&self.sender, &self.recipient]
            .into_iter()
            .filter(|binding| !binding.is_registered() && !binding.category().is_all())
            .map(CategoryBinding::category)
            .collect()
    }

    /// The rule identifier, if the rule had one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The sender category.
    pub fn sender_type(&self) -> &ActorCategory {
        self.sender.category()
    }

    /// The recipient category.
    pub fn recipient_type(&self) -> &ActorCategory {
        self.recipient.category()
    }

    /// The required relationship, if any.
    pub fn relationship(&self) -> Option<&str> {
        self.relationship.as_deref()
    }

    /// Whether the required relationship runs from recipient to sender.
    pub fn inverse_relationship(&self) -> bool {
        self.inverse_relationship
    }

    /// The shared-group relationship, if any.
    pub fn group_relationship(&self) -> Option<&str> {
        self.group_relationship.as_deref()
    }

    /// Check that `actor` may send under this policy.
    pub fn validate_sender_type(&self, actor: &Actor) -> bool {
        self.sender.validate(actor)
    }

    /// Check that `actor` may receive under this policy.
    pub fn validate_recipient_type(&self, actor: &Actor) -> bool {
        self.recipient.validate(actor)
    }

    /// Fragment restricting candidates to the recipient category.
    ///
    /// Empty when the category is `"all"` or has no candidate getter.
    pub fn recipient_clauses(&self) -> FilterFragment {
        self.recipient.candidate_clauses()
    }

    /// Fragment requiring the configured relationship between `sender` and
    /// the candidate.
    ///
    /// Without inversion the candidate must be the target of
    /// `sender --relationship--> candidate`; with inversion it must be the
    /// source of `candidate --relationship--> sender`.
    pub fn relationship_clauses(&self, sender: &Actor, aliases: &AliasAllocator) -> FilterFragment {
        let Some(name) = self.relationship.as_deref() else {
            return FilterFragment::empty();
        };

        let alias = aliases.allocate(RELATIONSHIP_PREFIX);
        let schema = &self.schema;
        let (candidate_end, sender_end) = if self.inverse_relationship {
            (&schema.subject_column, &schema.object_column)
        } else {
            (&schema.object_column, &schema.subject_column)
        };

        let join = Join::new(
            schema.relationship_table.clone(),
            alias.clone(),
            Predicate::eq(schema.entity_id(), column(&alias, candidate_end)),
        );
        let condition = Predicate::all(vec![
            Predicate::eq(column(&alias, sender_end), SqlValue::from(sender.id)),
            Predicate::eq(column(&alias, &schema.name_column), SqlValue::from(name)),
        ]);

        debug!(
            alias = %alias,
            relationship = name,
            inverse = self.inverse_relationship,
            sender = %sender.id,
            "emitting relationship clauses"
        );
        FilterFragment::new(vec![join], vec![condition])
    }

    /// Fragment requiring `sender` and the candidate to share a group.
    ///
    /// The sender's groups are the targets of
    /// `sender --group_relationship--> group`, joined under a fresh alias;
    /// the candidate qualifies when one of those groups is also a target of
    /// `candidate --group_relationship--> group`.
    pub fn group_relationship_clauses(
        &self,
        sender: &Actor,
        aliases: &AliasAllocator,
    ) -> FilterFragment {
        let Some(name) = self.group_relationship.as_deref() else {
            return FilterFragment::empty();
        };

        let alias = aliases.allocate(GROUP_RELATIONSHIP_PREFIX);
        let schema = &self.schema;

        let join = Join::new(
            schema.relationship_table.clone(),
            alias.clone(),
            Predicate::all(vec![
                Predicate::eq(column(&alias, &schema.subject_column), SqlValue::from(sender.id)),
                Predicate::eq(column(&alias, &schema.name_column), SqlValue::from(name)),
            ]),
        );
        let candidate_groups = Predicate::all(vec![
            Predicate::eq(Column::bare(schema.subject_column.clone()), schema.entity_id()),
            Predicate::eq(Column::bare(schema.name_column.clone()), SqlValue::from(name)),
        ]);
        let condition = Predicate::in_subquery(
            column(&alias, &schema.object_column),
            schema.object_column.clone(),
            schema.relationship_table.clone(),
            candidate_groups,
        );

        debug!(
            alias = %alias,
            group_relationship = name,
            sender = %sender.id,
            "emitting group relationship clauses"
        );
        FilterFragment::new(vec![join], vec![condition])
    }

    /// The complete recipient filter for `sender`: recipient category,
    /// relationship and shared group, conjoined.
    pub fn recipient_filter(&self, sender: &Actor, aliases: &AliasAllocator) -> FilterFragment {
        self.recipient_clauses()
            .and(self.relationship_clauses(sender, aliases))
            .and(self.group_relationship_clauses(sender, aliases))
    }

    /// Check whether `sender` may message `recipient`.
    ///
    /// This is the single-pair counterpart of `recipient_filter`: both actor
    /// types must validate, the relationship must exist in the configured
    /// direction, and the two must share a group when that is required.
    pub fn permits(
        &self,
        sender: &Actor,
        recipient: &Actor,
        graph: &dyn RelationshipGraph,
    ) -> bool {
        if !self.validate_sender_type(sender) || !self.validate_recipient_type(recipient) {
            return false;
        }

        if let Some(name) = self.relationship.as_deref() {
            let (from, to) = if self.inverse_relationship {
                (recipient.id, sender.id)
            } else {
                (sender.id, recipient.id)
            };
            if !graph.has_relationship(from, name, to) {
                return false;
            }
        }

        if let Some(name) = self.group_relationship.as_deref() {
            if !shares_group(graph, sender.id, recipient.id, name) {
                return false;
            }
        }

        true
    }
}

fn shares_group(graph: &dyn RelationshipGraph, a: ActorId, b: ActorId, name: &str) -> bool {
    graph
        .related(a, name)
        .into_iter()
        .any(|group| graph.has_relationship(b, name, group))
}

fn column(alias: &Ident, name: &Ident) -> Column {
    Column::qualified(alias.clone(), name.clone())
}

fn sanitize_relationship(
    field: &str,
    name: Option<String>,
    sanitizer: &dyn Sanitizer,
) -> Result<Option<String>> {
    let Some(name) = name else {
        return Ok(None);
    };
    if name.trim().is_empty() {
        return Ok(None);
    }

    let sanitized = sanitizer
        .sanitize_literal(&name)
        .map_err(|e| PolicyError::Sanitization {
            field: field.to_string(),
            reason: e.to_string(),
        })?;

    if sanitized == ActorCategory::ALL {
        Ok(None)
    } else {
        Ok(Some(sanitized))
    }
}
