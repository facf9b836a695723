//! SQL identifiers.
//!
//! Every table name, alias and column name that ends up in rendered SQL is
//! an `Ident`. Construction validates the name against
//! `[A-Za-z_][A-Za-z0-9_]*`, so identifiers never need quoting or escaping.

use inbox_core::error::{Error, QueryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_IDENT_LEN: usize = 64;

/// A validated SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ident(String);

impl Ident {
    /// Create an identifier, rejecting anything that is not a plain name.
    ///
    /// # Examples
    ///
    /// ```
    /// use inbox_query::Ident;
    ///
    /// assert!(Ident::new("entity_relationships").is_ok());
    /// assert!(Ident::new("e.guid").is_err());
    /// assert!(Ident::new("1abc").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if is_valid_identifier(&name) {
            Ok(Self(name))
        } else {
            Err(QueryError::InvalidIdentifier(name).into())
        }
    }

    /// Wrap a name built from known-valid parts.
    pub(crate) fn from_trusted(name: String) -> Self {
        debug_assert!(is_valid_identifier(&name), "bad identifier {:?}", name);
        Self(name)
    }

    /// Get the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check whether `name` is a plain SQL identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= MAX_IDENT_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl TryFrom<String> for Ident {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Ident> for String {
    fn from(ident: Ident) -> Self {
        ident.0
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
