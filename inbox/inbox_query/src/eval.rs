//! In-memory evaluation of filter fragments.
//!
//! `RelationalStore` holds rows for a handful of tables and answers the
//! question a real store answers when it runs a recipient query: which
//! entities satisfy the fragment? Joins are inner joins treated as
//! existence (an entity matching through several join rows is reported
//! once), and `IN` subqueries may reference the outer row. Logic is
//! two-valued: a comparison with `NULL` is false, and so is a missing
//! column.

use inbox_core::error::{QueryError, Result};
use inbox_core::{Actor, ActorId};
use std::collections::HashMap;
use tracing::debug;

use crate::expr::{Column, Operand, Predicate};
use crate::fragment::{FilterFragment, Join};
use crate::ident::{is_valid_identifier, Ident};
use crate::schema::StoreSchema;
use crate::value::SqlValue;

/// A row, keyed by column name.
pub type Row = HashMap<String, SqlValue>;

#[derive(Clone, Copy)]
struct Scope<'a> {
    alias: &'a str,
    row: &'a Row,
}

/// Rows of the entity store, held in memory.
#[derive(Debug, Clone)]
pub struct RelationalStore {
    schema: StoreSchema,
    tables: HashMap<Ident, Vec<Row>>,
}

impl RelationalStore {
    /// Create a store with empty entity and relationship tables.
    pub fn new(schema: StoreSchema) -> Self {
        let mut tables = HashMap::new();
        tables.insert(schema.entity_table.clone(), Vec::new());
        tables.insert(schema.relationship_table.clone(), Vec::new());
        Self { schema, tables }
    }

    /// The schema of this store.
    pub fn schema(&self) -> &StoreSchema {
        &self.schema
    }

    /// Append a row to a table, creating the table if needed.
    pub fn insert(&mut self, table: Ident, row: Row) -> &mut Self {
        self.tables.entry(table).or_default().push(row);
        self
    }

    /// Store an actor as an entity row.
    ///
    /// Scalar attributes whose names are valid identifiers become columns;
    /// other attributes are not queryable and are skipped. An existing row
    /// for the same actor is replaced.
    pub fn add_actor(&mut self, actor: &Actor) -> &mut Self {
        let id_column = self.schema.entity_id_column.as_str().to_string();
        let mut row = Row::new();
        for (name, value) in &actor.attributes {
            if !is_valid_identifier(name) {
                continue;
            }
            if let Some(value) = SqlValue::from_config(value) {
                row.insert(name.clone(), value);
            }
        }
        row.insert(id_column.clone(), actor.id.into());

        let id = SqlValue::from(actor.id);
        let entities = self
            .tables
            .entry(self.schema.entity_table.clone())
            .or_default();
        entities.retain(|existing| !existing.get(&id_column).is_some_and(|v| v.sql_eq(&id)));
        entities.push(row);
        self
    }

    /// Store a relationship `from --name--> to`.
    pub fn add_relationship(&mut self, from: ActorId, name: &str, to: ActorId) -> &mut Self {
        let mut row = Row::new();
        row.insert(self.schema.subject_column.to_string(), from.into());
        row.insert(self.schema.name_column.to_string(), name.into());
        row.insert(self.schema.object_column.to_string(), to.into());
        let table = self.schema.relationship_table.clone();
        self.insert(table, row)
    }

    /// Whether the relationship `from --name--> to` is stored.
    pub fn has_relationship(&self, from: ActorId, name: &str, to: ActorId) -> bool {
        self.relationships(from, name)
            .any(|row| self.endpoint(row, &self.schema.object_column) == Some(to))
    }

    /// Every `to` such that `from --name--> to` is stored.
    pub fn related(&self, from: ActorId, name: &str) -> Vec<ActorId> {
        self.relationships(from, name)
            .filter_map(|row| self.endpoint(row, &self.schema.object_column))
            .collect()
    }

    /// Identifiers of all stored entities, in insertion order.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.entity_rows()
            .iter()
            .filter_map(|row| self.endpoint(row, &self.schema.entity_id_column))
            .collect()
    }

    /// Whether the entity `candidate` satisfies the fragment.
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - Whether the candidate matches; `false` if it is not stored.
    /// * `Err` - If the fragment references an unknown alias or table.
    pub fn matches(&self, fragment: &FilterFragment, candidate: ActorId) -> Result<bool> {
        let id = SqlValue::from(candidate);
        let id_column = self.schema.entity_id_column.as_str();
        match self
            .entity_rows()
            .iter()
            .find(|row| row.get(id_column).is_some_and(|v| v.sql_eq(&id)))
        {
            Some(row) => self.row_matches(fragment, row),
            None => Ok(false),
        }
    }

    /// Identifiers of all entities satisfying the fragment, in insertion
    /// order.
    pub fn select(&self, fragment: &FilterFragment) -> Result<Vec<ActorId>> {
        let mut selected = Vec::new();
        for row in self.entity_rows() {
            if self.row_matches(fragment, row)? {
                if let Some(id) = self.endpoint(row, &self.schema.entity_id_column) {
                    selected.push(id);
                }
            }
        }
        debug!(
            joins = fragment.joins.len(),
            candidates = self.entity_rows().len(),
            selected = selected.len(),
            "evaluated fragment"
        );
        Ok(selected)
    }

    fn row_matches(&self, fragment: &FilterFragment, row: &Row) -> Result<bool> {
        let mut env = vec![Scope {
            alias: self.schema.entity_alias.as_str(),
            row,
        }];
        self.satisfy(&fragment.joins, &fragment.wheres, &mut env)
    }

    fn satisfy<'a>(
        &'a self,
        joins: &'a [Join],
        wheres: &'a [Predicate],
        env: &mut Vec<Scope<'a>>,
    ) -> Result<bool> {
        let Some((join, rest)) = joins.split_first() else {
            for predicate in wheres {
                if !self.eval(predicate, env)? {
                    return Ok(false);
                }
            }
            return Ok(true);
        };

        for row in self.table(&join.table)? {
            env.push(Scope {
                alias: join.alias.as_str(),
                row,
            });
            let outcome = match self.eval(&join.on, env) {
                Ok(true) => self.satisfy(rest, wheres, env),
                other => other,
            };
            env.pop();
            if outcome? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn eval<'a>(&'a self, predicate: &'a Predicate, env: &mut Vec<Scope<'a>>) -> Result<bool> {
        match predicate {
            Predicate::Eq(left, right) => {
                let left = self.operand(left, env)?;
                let right = self.operand(right, env)?;
                Ok(left.sql_eq(&right))
            }
            Predicate::In(operand, subquery) => {
                let needle = self.operand(operand, env)?;
                for row in self.table(&subquery.table)? {
                    env.push(Scope {
                        alias: subquery.table.as_str(),
                        row,
                    });
                    let hit = self.eval(&subquery.filter, env).map(|keep| {
                        keep && row
                            .get(subquery.column.as_str())
                            .is_some_and(|v| v.sql_eq(&needle))
                    });
                    env.pop();
                    if hit? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::And(children) => {
                for child in children {
                    if !self.eval(child, env)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Or(children) => {
                for child in children {
                    if self.eval(child, env)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::Not(child) => Ok(!self.eval(child, env)?),
        }
    }

    fn operand(&self, operand: &Operand, env: &[Scope<'_>]) -> Result<SqlValue> {
        match operand {
            Operand::Value(value) => Ok(value.clone()),
            Operand::Column(column) => self.column(column, env),
        }
    }

    fn column(&self, column: &Column, env: &[Scope<'_>]) -> Result<SqlValue> {
        let scope = match &column.qualifier {
            Some(qualifier) => env
                .iter()
                .rev()
                .find(|scope| scope.alias == qualifier.as_str())
                .ok_or_else(|| QueryError::UnknownAlias(qualifier.to_string()))?,
            None => env
                .last()
                .ok_or_else(|| QueryError::UnknownAlias(column.name.to_string()))?,
        };
        Ok(scope
            .row
            .get(column.name.as_str())
            .cloned()
            .unwrap_or(SqlValue::Null))
    }

    fn table(&self, table: &Ident) -> Result<&[Row]> {
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| QueryError::UnknownTable(table.to_string()).into())
    }

    fn entity_rows(&self) -> &[Row] {
        self.tables
            .get(&self.schema.entity_table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn relationships<'a>(&'a self, from: ActorId, name: &'a str) -> impl Iterator<Item = &'a Row> {
        let from = SqlValue::from(from);
        let name = SqlValue::from(name);
        let subject = self.schema.subject_column.as_str();
        let name_column = self.schema.name_column.as_str();
        self.tables
            .get(&self.schema.relationship_table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter(move |row| {
                row.get(subject).is_some_and(|v| v.sql_eq(&from))
                    && row.get(name_column).is_some_and(|v| v.sql_eq(&name))
            })
    }

    fn endpoint(&self, row: &Row, column: &Ident) -> Option<ActorId> {
        match row.get(column.as_str())? {
            SqlValue::Unsigned(id) => Some(ActorId::new(*id)),
            SqlValue::Integer(id) => u64::try_from(*id).ok().map(ActorId::new),
            _ => None,
        }
    }
}

impl Default for RelationalStore {
    fn default() -> Self {
        Self::new(StoreSchema::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Ident {
        Ident::new(s).unwrap()
    }

    fn col(q: &str, n: &str) -> Column {
        Column::qualified(ident(q), ident(n))
    }

    fn store() -> RelationalStore {
        let mut store = RelationalStore::default();
        for id in 1..=4 {
            store.add_actor(&Actor::new(id).with_attribute("admin", id == 4));
        }
        store
            .add_relationship(ActorId::new(1), "friend", ActorId::new(2))
            .add_relationship(ActorId::new(1), "friend", ActorId::new(3))
            .add_relationship(ActorId::new(3), "friend", ActorId::new(1));
        store
    }

    fn friends_of(sender: u64) -> FilterFragment {
        FilterFragment::new(
            vec![Join::new(
                ident("entity_relationships"),
                ident("rel0"),
                Predicate::eq(col("e", "guid"), col("rel0", "guid_two")),
            )],
            vec![Predicate::all(vec![
                Predicate::eq(col("rel0", "guid_one"), SqlValue::Unsigned(sender)),
                Predicate::eq(col("rel0", "relationship"), SqlValue::from("friend")),
            ])],
        )
    }

    #[test]
    fn test_empty_fragment_selects_everyone() {
        let store = store();
        assert_eq!(store.select(&FilterFragment::empty()).unwrap(), store.actor_ids());
    }

    #[test]
    fn test_join_selects_targets() {
        let store = store();
        assert_eq!(
            store.select(&friends_of(1)).unwrap(),
            vec![ActorId::new(2), ActorId::new(3)]
        );
        assert_eq!(store.select(&friends_of(3)).unwrap(), vec![ActorId::new(1)]);
        assert!(store.select(&friends_of(2)).unwrap().is_empty());
    }

    #[test]
    fn test_attribute_predicate() {
        let store = store();
        let admins = FilterFragment::new(
            Vec::new(),
            vec![Predicate::eq(col("e", "admin"), SqlValue::Bool(true))],
        );
        assert_eq!(store.select(&admins).unwrap(), vec![ActorId::new(4)]);
        assert!(store.matches(&admins, ActorId::new(4)).unwrap());
        assert!(!store.matches(&admins, ActorId::new(1)).unwrap());
        assert!(!store.matches(&admins, ActorId::new(99)).unwrap());
    }

    #[test]
    fn test_correlated_subquery() {
        let store = store();
        // Entities that have at least one outgoing friend relationship.
        let has_friends = FilterFragment::new(
            Vec::new(),
            vec![Predicate::in_subquery(
                col("e", "guid"),
                ident("guid_one"),
                ident("entity_relationships"),
                Predicate::eq(Column::bare(ident("relationship")), SqlValue::from("friend")),
            )],
        );
        assert_eq!(
            store.select(&has_friends).unwrap(),
            vec![ActorId::new(1), ActorId::new(3)]
        );
    }

    #[test]
    fn test_unknown_alias_and_table() {
        let store = store();
        let bad_alias = FilterFragment::new(
            Vec::new(),
            vec![Predicate::eq(col("x", "guid"), SqlValue::Unsigned(1))],
        );
        assert!(store.select(&bad_alias).is_err());

        let bad_table = FilterFragment::new(
            vec![Join::new(
                ident("missing"),
                ident("m"),
                Predicate::eq(col("m", "guid"), col("e", "guid")),
            )],
            Vec::new(),
        );
        assert!(store.select(&bad_table).is_err());
    }

    #[test]
    fn test_relationship_lookups() {
        let store = store();
        assert!(store.has_relationship(ActorId::new(1), "friend", ActorId::new(2)));
        assert!(!store.has_relationship(ActorId::new(2), "friend", ActorId::new(1)));
        assert_eq!(
            store.related(ActorId::new(1), "friend"),
            vec![ActorId::new(2), ActorId::new(3)]
        );
    }

    #[test]
    fn test_add_actor_replaces_row() {
        let mut store = store();
        store.add_actor(&Actor::new(1).with_attribute("admin", true));
        assert_eq!(store.actor_ids().len(), 4);
        let admins = FilterFragment::new(
            Vec::new(),
            vec![Predicate::eq(col("e", "admin"), SqlValue::Bool(true))],
        );
        assert_eq!(
            store.select(&admins).unwrap(),
            vec![ActorId::new(4), ActorId::new(1)]
        );
    }
}
