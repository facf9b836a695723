//! Literal and identifier sanitization.
//!
//! Relationship names and other configured strings are sanitized once, when
//! a policy is constructed. After that they are carried as bound parameters,
//! and are only quoted inline when a renderer is explicitly asked for inline
//! SQL.

use inbox_core::error::{QueryError, Result};

use crate::ident::Ident;

/// A store-specific sanitizer.
///
/// The store layer owns the rules for what is safe to embed. Policies only
/// call through this trait and never escape values themselves.
pub trait Sanitizer: Send + Sync {
    /// Clean a literal so that it is safe to store and later embed.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The cleaned literal.
    /// * `Err` - If nothing usable remains.
    fn sanitize_literal(&self, value: &str) -> Result<String>;

    /// Validate an identifier such as a table prefix or column name.
    fn sanitize_identifier(&self, value: &str) -> Result<Ident> {
        Ident::new(value)
    }

    /// Quote a literal for inline embedding.
    fn quote_literal(&self, value: &str) -> String;
}

/// Sanitizer for MySQL-compatible stores.
///
/// Control characters are dropped, surrounding whitespace is trimmed, and
/// inline quoting doubles single quotes and escapes backslashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSanitizer;

impl Sanitizer for DefaultSanitizer {
    fn sanitize_literal(&self, value: &str) -> Result<String> {
        let cleaned: String = value.chars().filter(|c| !c.is_control()).collect();
        let cleaned = cleaned.trim();

        if cleaned.is_empty() {
            return Err(QueryError::InvalidLiteral(format!(
                "{:?} is empty once control characters are removed",
                value
            ))
            .into());
        }

        Ok(cleaned.to_string())
    }

    fn quote_literal(&self, value: &str) -> String {
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('\'');
        for c in value.chars().filter(|c| !c.is_control()) {
            match c {
                '\'' => quoted.push_str("''"),
                '\\' => quoted.push_str("\\\\"),
                c => quoted.push(c),
            }
        }
        quoted.push('\'');
        quoted
    }
}
