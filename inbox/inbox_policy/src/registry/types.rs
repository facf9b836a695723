//! Built-in actor types.

use inbox_core::{Actor, ConfigValue};
use inbox_query::{CandidateClauses, Clauses, Column, Ident, Predicate, SqlValue, StoreSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::ActorType;

type Validator = dyn Fn(&Actor, &str) -> bool + Send + Sync;
type Getter = dyn Fn(&str) -> CandidateClauses + Send + Sync;

/// The type bound to a category nobody registered.
///
/// It has no capabilities, so validation against it fails closed and bulk
/// filtering fails open.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnregisteredType;

impl ActorType for UnregisteredType {
    fn validate(&self, _actor: &Actor, _category: &str) -> Option<bool> {
        None
    }

    fn candidate_filter(&self, _category: &str) -> Option<CandidateClauses> {
        None
    }
}

/// An actor type backed by closures.
///
/// # Examples
///
/// ```
/// use inbox_core::Actor;
/// use inbox_policy::{ActorType, FnActorType};
///
/// let admin = FnActorType::new().with_validator(|actor, _| actor.flag("admin"));
/// assert_eq!(admin.validate(&Actor::new(1).with_attribute("admin", true), "admin"), Some(true));
/// assert!(admin.candidate_filter("admin").is_none());
/// ```
#[derive(Clone, Default)]
pub struct FnActorType {
    validator: Option<Arc<Validator>>,
    getter: Option<Arc<Getter>>,
}

impl FnActorType {
    /// A type with no capabilities yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `validator` to check single actors.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Actor, &str) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Use `getter` to produce bulk candidate filters.
    pub fn with_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&str) -> CandidateClauses + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
        self
    }
}

impl fmt::Debug for FnActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnActorType")
            .field("validator", &self.validator.is_some())
            .field("getter", &self.getter.is_some())
            .finish()
    }
}

impl ActorType for FnActorType {
    fn validate(&self, actor: &Actor, category: &str) -> Option<bool> {
        self.validator.as_ref().map(|validate| validate(actor, category))
    }

    fn candidate_filter(&self, category: &str) -> Option<CandidateClauses> {
        self.getter.as_ref().map(|get| get(category))
    }
}

fn default_true() -> bool {
    true
}

fn default_entity_alias() -> Ident {
    StoreSchema::default().entity_alias
}

/// An actor type defined by an attribute value.
///
/// With a bulk filter, an actor belongs to the category when its attribute
/// is a scalar equal to `value` under the same comparison the filter's
/// `e.<attribute> = value` gets in the store: numbers compare by value and
/// lists never match, since a list is not a column value.
///
/// Multi-valued attributes such as role lists need `bulk_filter = false`.
/// The actor then also belongs to the category when one element of the
/// list equals `value`, and bulk searches are not narrowed by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeActorType {
    /// Attribute, and entity column, that identifies the category.
    pub attribute: Ident,

    /// Value the attribute must hold.
    pub value: ConfigValue,

    /// Whether bulk filters are offered.
    #[serde(default = "default_true")]
    pub bulk_filter: bool,

    /// Alias of the entity table the bulk filter refers to.
    #[serde(skip, default = "default_entity_alias")]
    pub entity_alias: Ident,
}

impl AttributeActorType {
    /// Actors whose `attribute` holds `value`.
    pub fn new(attribute: Ident, value: impl Into<ConfigValue>) -> Self {
        Self {
            attribute,
            value: value.into(),
            bulk_filter: true,
            entity_alias: default_entity_alias(),
        }
    }

    /// Refer to the entity table under a different alias.
    pub fn with_entity_alias(mut self, alias: Ident) -> Self {
        self.entity_alias = alias;
        self
    }

    /// Offer no bulk filter.
    pub fn without_bulk_filter(mut self) -> Self {
        self.bulk_filter = false;
        self
    }

    /// Whether a bulk filter is offered: it must be enabled and `value`
    /// must have a column form.
    pub fn offers_bulk_filter(&self) -> bool {
        self.bulk_filter && SqlValue::from_config(&self.value).is_some()
    }
}

fn scalar_eq(held: &ConfigValue, value: &ConfigValue) -> bool {
    match (SqlValue::from_config(held), SqlValue::from_config(value)) {
        (Some(held), Some(value)) => held.sql_eq(&value),
        _ => false,
    }
}

impl ActorType for AttributeActorType {
    fn validate(&self, actor: &Actor, _category: &str) -> Option<bool> {
        let Some(held) = actor.attribute(self.attribute.as_str()) else {
            return Some(false);
        };

        if self.offers_bulk_filter() {
            return Some(scalar_eq(held, &self.value));
        }
        let verdict = match held.as_array() {
            Some(items) => items.iter().any(|item| scalar_eq(item, &self.value)),
            None => scalar_eq(held, &self.value),
        };
        Some(verdict)
    }

    fn candidate_filter(&self, _category: &str) -> Option<CandidateClauses> {
        if !self.offers_bulk_filter() {
            return None;
        }
        let value = SqlValue::from_config(&self.value)?;
        let column = Column::qualified(self.entity_alias.clone(), self.attribute.clone());
        Some(CandidateClauses::wheres(Clauses::One(Predicate::eq(
            column, value,
        ))))
    }
}
