//! Filter fragments.
//!
//! A fragment is one constraint on a bulk recipient search: the joins it
//! needs plus the where-predicates it adds. Fragments compose by
//! concatenating joins and conjoining predicates, and the empty fragment is
//! the identity of that composition.

use serde::{Deserialize, Serialize};

use crate::expr::Predicate;
use crate::ident::Ident;

/// An inner join of a table under an alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    /// Table to join, without prefix.
    pub table: Ident,

    /// Alias of the joined table.
    pub alias: Ident,

    /// Join condition.
    pub on: Predicate,
}

impl Join {
    /// Create a join.
    pub fn new(table: Ident, alias: Ident, on: Predicate) -> Self {
        Self { table, alias, on }
    }
}

/// Joins and where-predicates to splice into a recipient query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterFragment {
    /// Joins, in the order they must be rendered.
    pub joins: Vec<Join>,

    /// Predicates that must all hold.
    pub wheres: Vec<Predicate>,
}

impl FilterFragment {
    /// The fragment that constrains nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a fragment from joins and predicates.
    pub fn new(joins: Vec<Join>, wheres: Vec<Predicate>) -> Self {
        Self { joins, wheres }
    }

    /// Whether this fragment constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.joins.is_empty() && self.wheres.iter().all(Predicate::is_trivially_true)
    }

    /// Merge another fragment into this one.
    ///
    /// Joins are appended without deduplication; predicates are conjoined.
    pub fn merge(&mut self, other: FilterFragment) {
        self.joins.extend(other.joins);
        self.wheres.extend(other.wheres);
    }

    /// Conjunction of this fragment and another.
    pub fn and(mut self, other: FilterFragment) -> Self {
        self.merge(other);
        self
    }

    /// All where-predicates as a single conjunction.
    pub fn where_predicate(&self) -> Predicate {
        Predicate::all(self.wheres.iter().cloned())
    }

    /// Aliases introduced by this fragment's joins.
    pub fn aliases(&self) -> impl Iterator<Item = &Ident> {
        self.joins.iter().map(|join| &join.alias)
    }
}

impl FromIterator<FilterFragment> for FilterFragment {
    fn from_iter<I: IntoIterator<Item = FilterFragment>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::and)
    }
}

/// One item or a sequence of items, as produced by candidate getters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Clauses<T> {
    /// A single item, passed through unchanged.
    One(T),

    /// A sequence of items, combined conjunctively.
    Many(Vec<T>),
}

impl<T> Clauses<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Descriptors returned by an actor type's candidate getter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateClauses {
    /// Joins needed to reach the columns the predicates test.
    #[serde(default)]
    pub joins: Option<Clauses<Join>>,

    /// Conditions a candidate must meet.
    #[serde(default)]
    pub wheres: Option<Clauses<Predicate>>,
}

impl CandidateClauses {
    /// Candidate clauses with only where-predicates.
    pub fn wheres(wheres: Clauses<Predicate>) -> Self {
        Self {
            joins: None,
            wheres: Some(wheres),
        }
    }

    /// Add joins.
    pub fn with_joins(mut self, joins: Clauses<Join>) -> Self {
        self.joins = Some(joins);
        self
    }

    /// Normalize into a fragment.
    ///
    /// A sequence of predicates becomes one conjunction; a single predicate
    /// passes through. A sequence of joins is kept in order, since a join
    /// list is already conjunctive.
    pub fn into_fragment(self) -> FilterFragment {
        let joins = self.joins.map(Clauses::into_vec).unwrap_or_default();
        let wheres = match self.wheres {
            None => Vec::new(),
            Some(Clauses::One(predicate)) => vec![predicate],
            Some(Clauses::Many(predicates)) if predicates.is_empty() => Vec::new(),
            Some(Clauses::Many(predicates)) => vec![Predicate::all(predicates)],
        };
        FilterFragment::new(joins, wheres)
    }
}
