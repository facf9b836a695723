//! Predicate trees.
//!
//! Predicates are built from typed nodes rather than strings: column
//! references, bound values, equality, membership in a subquery, and the
//! boolean connectives. A renderer turns them into SQL for a particular
//! store, and the in-memory evaluator interprets them directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ident::Ident;
use crate::value::SqlValue;

/// A column reference.
///
/// An unqualified column refers to the row of the innermost subquery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Table alias the column belongs to.
    pub qualifier: Option<Ident>,

    /// Column name.
    pub name: Ident,
}

impl Column {
    /// A column qualified by a table alias, e.g. `rel0.guid_one`.
    pub fn qualified(qualifier: Ident, name: Ident) -> Self {
        Self {
            qualifier: Some(qualifier),
            name,
        }
    }

    /// A column of the innermost subquery row.
    pub fn bare(name: Ident) -> Self {
        Self {
            qualifier: None,
            name,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}", q, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// A column reference.
    Column(Column),

    /// A bound value.
    Value(SqlValue),
}

impl From<Column> for Operand {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<SqlValue> for Operand {
    fn from(value: SqlValue) -> Self {
        Self::Value(value)
    }
}

/// `SELECT column FROM table WHERE filter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subquery {
    /// Column projected by the subquery.
    pub column: Ident,

    /// Table the subquery reads, without prefix.
    pub table: Ident,

    /// Row filter; may reference outer aliases.
    pub filter: Box<Predicate>,
}

/// A boolean condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// `left = right`
    Eq(Operand, Operand),

    /// `operand IN (subquery)`
    In(Operand, Subquery),

    /// All of the children hold. An empty list is true.
    And(Vec<Predicate>),

    /// Any of the children holds. An empty list is false.
    Or(Vec<Predicate>),

    /// The child does not hold.
    Not(Box<Predicate>),
}

impl Predicate {
    /// `left = right`
    pub fn eq(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self::Eq(left.into(), right.into())
    }

    /// `operand IN (SELECT column FROM table WHERE filter)`
    pub fn in_subquery(
        operand: impl Into<Operand>,
        column: Ident,
        table: Ident,
        filter: Predicate,
    ) -> Self {
        Self::In(
            operand.into(),
            Subquery {
                column,
                table,
                filter: Box::new(filter),
            },
        )
    }

    /// Conjunction that flattens nested conjunctions and collapses a single
    /// child into itself.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for predicate in predicates {
            match predicate {
                Self::And(children) => flat.extend(children),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Self::And(flat)
        }
    }

    /// Disjunction that collapses a single child into itself.
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut children: Vec<_> = predicates.into_iter().collect();
        if children.len() == 1 {
            children.remove(0)
        } else {
            Self::Or(children)
        }
    }

    /// Negation.
    pub fn negate(predicate: Predicate) -> Self {
        Self::Not(Box::new(predicate))
    }

    /// Whether this is the empty conjunction.
    pub fn is_trivially_true(&self) -> bool {
        matches!(self, Self::And(children) if children.is_empty())
    }
}
