//! Query values.
//!
//! Values appear in predicates as bound parameters. The in-memory evaluator
//! compares them with SQL equality semantics: `NULL` never equals anything,
//! and signed and unsigned integers compare numerically.

use inbox_core::{ActorId, ConfigValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,

    /// Boolean.
    Bool(bool),

    /// Signed integer.
    Integer(i64),

    /// Unsigned integer, used for entity identifiers.
    Unsigned(u64),

    /// Text.
    Text(String),
}

impl SqlValue {
    /// SQL equality: `NULL` on either side is never equal.
    pub fn sql_eq(&self, other: &SqlValue) -> bool {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Unsigned(a), Self::Unsigned(b)) => a == b,
            (Self::Integer(a), Self::Unsigned(b)) | (Self::Unsigned(b), Self::Integer(a)) => {
                u64::try_from(*a).map(|a| a == *b).unwrap_or(false)
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }

    /// Convert an attribute value into a comparable scalar.
    ///
    /// Arrays and maps have no scalar form and yield `None`.
    pub fn from_config(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Null => Some(Self::Null),
            ConfigValue::Bool(b) => Some(Self::Bool(*b)),
            ConfigValue::Integer(i) => Some(Self::Integer(*i)),
            ConfigValue::Float(f) => value
                .as_integer()
                .map(Self::Integer)
                .or_else(|| Some(Self::Text(f.to_string()))),
            ConfigValue::String(s) => Some(Self::Text(s.clone())),
            ConfigValue::Array(_) | ConfigValue::Map(_) => None,
        }
    }
}

impl From<ActorId> for SqlValue {
    fn from(id: ActorId) -> Self {
        Self::Unsigned(id.get())
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Unsigned(u) => write!(f, "{}", u),
            Self::Text(s) => write!(f, "{:?}", s),
        }
    }
}
