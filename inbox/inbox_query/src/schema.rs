//! Store schema.
//!
//! Names of the tables and columns that generated fragments refer to. The
//! defaults match the classic entity/relationship layout: entities are
//! filtered under the alias `e`, and relationships are rows of
//! `(guid_one, relationship, guid_two)`.

use inbox_core::error::{QueryError, Result};
use serde::{Deserialize, Serialize};

use crate::expr::Column;
use crate::ident::Ident;

/// Table and column names of the entity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSchema {
    /// Prefix prepended to every table name when rendering.
    pub table_prefix: String,

    /// Table holding the entities being filtered.
    pub entity_table: Ident,

    /// Alias of the entity table in the outer query.
    pub entity_alias: Ident,

    /// Identifier column of the entity table.
    pub entity_id_column: Ident,

    /// Table holding relationships between entities.
    pub relationship_table: Ident,

    /// Column holding the first endpoint of a relationship.
    pub subject_column: Ident,

    /// Column holding the relationship name.
    pub name_column: Ident,

    /// Column holding the second endpoint of a relationship.
    pub object_column: Ident,
}

impl Default for StoreSchema {
    fn default() -> Self {
        Self {
            table_prefix: String::new(),
            entity_table: Ident::from_trusted("entities".to_string()),
            entity_alias: Ident::from_trusted("e".to_string()),
            entity_id_column: Ident::from_trusted("guid".to_string()),
            relationship_table: Ident::from_trusted("entity_relationships".to_string()),
            subject_column: Ident::from_trusted("guid_one".to_string()),
            name_column: Ident::from_trusted("relationship".to_string()),
            object_column: Ident::from_trusted("guid_two".to_string()),
        }
    }
}

impl StoreSchema {
    /// Use the given table prefix.
    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Result<Self> {
        self.table_prefix = prefix.into();
        self.validate()?;
        Ok(self)
    }

    /// Check that the table prefix is safe to prepend to identifiers.
    pub fn validate(&self) -> Result<()> {
        let ok = self
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if ok {
            Ok(())
        } else {
            Err(QueryError::InvalidIdentifier(self.table_prefix.clone()).into())
        }
    }

    /// Full name of a table, with the prefix applied.
    pub fn table_name(&self, table: &Ident) -> String {
        format!("{}{}", self.table_prefix, table)
    }

    /// The identifier column of the entity being filtered, e.g. `e.guid`.
    pub fn entity_id(&self) -> Column {
        Column::qualified(self.entity_alias.clone(), self.entity_id_column.clone())
    }
}
