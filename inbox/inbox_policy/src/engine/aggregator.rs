//! Policy aggregation.
//!
//! A sender may message a recipient when any policy in the set permits it.
//! The bulk counterpart is a disjunction: each applicable policy yields its
//! own recipient filter, and the allowed recipients are the union of what
//! those filters select.

use inbox_core::error::Result;
use inbox_core::{Actor, ActorId};
use inbox_query::{AliasAllocator, FilterFragment, RelationalStore};
use std::collections::HashSet;
use tracing::debug;

use crate::engine::Policy;
use crate::integration::RelationshipGraph;

/// An ordered collection of policies.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    policies: Vec<Policy>,
}

impl PolicySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a policy.
    pub fn push(&mut self, policy: Policy) {
        self.policies.push(policy);
    }

    /// Number of policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether the set holds no policies.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Iterate over the policies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter()
    }

    /// Policies whose sender type admits `sender`.
    ///
    /// # Arguments
    ///
    /// * `sender` - The actor that wants to send.
    ///
    /// # Returns
    ///
    /// The applicable policies, in insertion order.
    pub fn policies_for_sender<'a>(&'a self, sender: &'a Actor) -> impl Iterator<Item = &'a Policy> {
        self.policies
            .iter()
            .filter(move |policy| policy.validate_sender_type(sender))
    }

    /// Check whether any policy lets `sender` message `recipient`.
    pub fn permits_any(
        &self,
        sender: &Actor,
        recipient: &Actor,
        graph: &dyn RelationshipGraph,
    ) -> bool {
        self.policies
            .iter()
            .any(|policy| policy.permits(sender, recipient, graph))
    }

    /// One recipient filter per policy applicable to `sender`.
    ///
    /// The filters are alternatives: a candidate is allowed when it
    /// satisfies at least one of them. An empty result means no policy
    /// lets `sender` send at all, while an empty filter in the result means
    /// every candidate is allowed.
    pub fn recipient_filters(&self, sender: &Actor, aliases: &AliasAllocator) -> Vec<FilterFragment> {
        self.policies_for_sender(sender)
            .map(|policy| policy.recipient_filter(sender, aliases))
            .collect()
    }

    /// Select every recipient `sender` may message from `store`.
    ///
    /// # Arguments
    ///
    /// * `sender` - The actor that wants to send.
    /// * `store` - The store holding candidate actors and relationships.
    /// * `aliases` - Allocator for join aliases.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ActorId>)` - Allowed recipients in store order, without duplicates.
    /// * `Err` - If a filter refers to something the store does not hold.
    pub fn select_recipients(
        &self,
        sender: &Actor,
        store: &RelationalStore,
        aliases: &AliasAllocator,
    ) -> Result<Vec<ActorId>> {
        let mut allowed = HashSet::new();
        for fragment in self.recipient_filters(sender, aliases) {
            allowed.extend(store.select(&fragment)?);
        }

        let recipients: Vec<ActorId> = store
            .actor_ids()
            .into_iter()
            .filter(|id| allowed.contains(id))
            .collect();

        debug!(
            sender = %sender.id,
            policies = self.len(),
            recipients = recipients.len(),
            "selected recipients"
        );
        Ok(recipients)
    }
}

impl FromIterator<Policy> for PolicySet {
    fn from_iter<I: IntoIterator<Item = Policy>>(iter: I) -> Self {
        Self {
            policies: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PolicySet {
    type Item = &'a Policy;
    type IntoIter = std::slice::Iter<'a, Policy>;

    fn into_iter(self) -> Self::IntoIter {
        self.policies.iter()
    }
}
