//! SQL rendering.
//!
//! `SqlRenderer` turns a fragment into the join and where text a caller
//! splices into its recipient query. Values become placeholders and are
//! returned in `params`, in placeholder order. Inline rendering quotes
//! values through the sanitizer instead; it exists for logging and for
//! stores without parameter binding.

use inbox_core::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::expr::{Operand, Predicate};
use crate::fragment::{FilterFragment, Join};
use crate::sanitize::{DefaultSanitizer, Sanitizer};
use crate::schema::StoreSchema;
use crate::value::SqlValue;

/// Placeholder style for bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placeholder {
    /// `?`, as used by MySQL and SQLite drivers.
    #[default]
    Question,

    /// `$1`, `$2`, ... as used by PostgreSQL drivers.
    Dollar,

    /// Values are quoted inline through the sanitizer.
    Inline,
}

/// Rendered join and where text plus bound parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedFragment {
    /// Join clauses separated by spaces.
    pub joins: String,

    /// Where condition, without the `WHERE` keyword.
    pub wheres: String,

    /// Bound values, in placeholder order.
    pub params: Vec<SqlValue>,
}

impl RenderedFragment {
    /// Whether there is nothing to splice.
    pub fn is_empty(&self) -> bool {
        self.joins.is_empty() && self.wheres.is_empty()
    }
}

/// Renders fragments for a particular store.
pub struct SqlRenderer {
    schema: StoreSchema,
    placeholder: Placeholder,
    param_offset: usize,
    sanitizer: Box<dyn Sanitizer>,
}

impl SqlRenderer {
    /// Create a renderer for the given schema.
    ///
    /// # Returns
    ///
    /// * `Ok(SqlRenderer)` - The renderer.
    /// * `Err` - If the schema's table prefix is not a safe identifier part.
    pub fn new(schema: StoreSchema, placeholder: Placeholder) -> Result<Self> {
        schema.validate()?;
        Ok(Self {
            schema,
            placeholder,
            param_offset: 0,
            sanitizer: Box::new(DefaultSanitizer),
        })
    }

    /// Number `$n` placeholders after `offset` parameters the caller
    /// already bound.
    pub fn with_param_offset(mut self, offset: usize) -> Self {
        self.param_offset = offset;
        self
    }

    /// Quote inline values with a store-specific sanitizer.
    pub fn with_sanitizer(mut self, sanitizer: Box<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// The schema this renderer targets.
    pub fn schema(&self) -> &StoreSchema {
        &self.schema
    }

    /// Render a fragment.
    ///
    /// Joins are rendered before predicates, so parameters of join
    /// conditions come first.
    pub fn render(&self, fragment: &FilterFragment) -> RenderedFragment {
        let mut out = RenderedFragment::default();

        let joins: Vec<String> = fragment
            .joins
            .iter()
            .map(|join| self.render_join(join, &mut out.params))
            .collect();
        out.joins = joins.join(" ");

        let wheres: Vec<&Predicate> = fragment
            .wheres
            .iter()
            .filter(|p| !p.is_trivially_true())
            .collect();
        out.wheres = match wheres.as_slice() {
            [] => String::new(),
            [single] => self.render_predicate(single, &mut out.params, false),
            many => many
                .iter()
                .map(|p| self.render_predicate(p, &mut out.params, true))
                .collect::<Vec<_>>()
                .join(" AND "),
        };

        debug!(
            joins = fragment.joins.len(),
            params = out.params.len(),
            placeholder = ?self.placeholder,
            "rendered fragment"
        );
        out
    }

    fn render_join(&self, join: &Join, params: &mut Vec<SqlValue>) -> String {
        format!(
            "JOIN {} {} ON {}",
            self.schema.table_name(&join.table),
            join.alias,
            self.render_predicate(&join.on, params, false)
        )
    }

    fn render_predicate(
        &self,
        predicate: &Predicate,
        params: &mut Vec<SqlValue>,
        nested: bool,
    ) -> String {
        match predicate {
            Predicate::Eq(left, right) => format!(
                "{} = {}",
                self.render_operand(left, params),
                self.render_operand(right, params)
            ),
            Predicate::In(operand, subquery) => {
                let operand = self.render_operand(operand, params);
                format!(
                    "{} IN (SELECT {} FROM {} WHERE {})",
                    operand,
                    subquery.column,
                    self.schema.table_name(&subquery.table),
                    self.render_predicate(&subquery.filter, params, false)
                )
            }
            Predicate::And(children) if children.is_empty() => "1 = 1".to_string(),
            Predicate::Or(children) if children.is_empty() => "1 = 0".to_string(),
            Predicate::And(children) => {
                let text = self.render_children(children, " AND ", params);
                if nested {
                    format!("({})", text)
                } else {
                    text
                }
            }
            Predicate::Or(children) => {
                let text = self.render_children(children, " OR ", params);
                if nested {
                    format!("({})", text)
                } else {
                    text
                }
            }
            Predicate::Not(child) => format!("NOT ({})", self.render_predicate(child, params, false)),
        }
    }

    fn render_children(
        &self,
        children: &[Predicate],
        separator: &str,
        params: &mut Vec<SqlValue>,
    ) -> String {
        children
            .iter()
            .map(|child| self.render_predicate(child, params, true))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn render_operand(&self, operand: &Operand, params: &mut Vec<SqlValue>) -> String {
        match operand {
            Operand::Column(column) => column.to_string(),
            Operand::Value(value) => self.bind(value, params),
        }
    }

    fn bind(&self, value: &SqlValue, params: &mut Vec<SqlValue>) -> String {
        match self.placeholder {
            Placeholder::Question => {
                params.push(value.clone());
                "?".to_string()
            }
            Placeholder::Dollar => {
                params.push(value.clone());
                format!("${}", self.param_offset + params.len())
            }
            Placeholder::Inline => match value {
                SqlValue::Null => "NULL".to_string(),
                SqlValue::Bool(true) => "1".to_string(),
                SqlValue::Bool(false) => "0".to_string(),
                SqlValue::Integer(i) => i.to_string(),
                SqlValue::Unsigned(u) => u.to_string(),
                SqlValue::Text(s) => self.sanitizer.quote_literal(s),
            },
        }
    }
}
