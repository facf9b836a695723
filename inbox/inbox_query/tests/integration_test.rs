//! Integration tests for the query fragment crate.
//!
//! Fragments are built against a store with non-default table and column
//! names, rendered, and evaluated in memory.

use inbox_core::{Actor, ActorId};
use inbox_query::{
    Column, DefaultSanitizer, FilterFragment, Ident, Join, Placeholder, Predicate,
    RelationalStore, Sanitizer, SqlRenderer, SqlValue, StoreSchema,
};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn ident(s: &str) -> Ident {
    Ident::new(s).unwrap()
}

fn custom_schema() -> StoreSchema {
    StoreSchema {
        table_prefix: "app_".to_string(),
        entity_table: ident("users"),
        entity_alias: ident("u"),
        entity_id_column: ident("id"),
        relationship_table: ident("edges"),
        subject_column: ident("src"),
        name_column: ident("kind"),
        object_column: ident("dst"),
    }
}

/// Users followed by `sender`, excluding banned ones.
fn followed_by(schema: &StoreSchema, sender: u64) -> FilterFragment {
    let edge = ident("f0");
    FilterFragment::new(
        vec![Join::new(
            schema.relationship_table.clone(),
            edge.clone(),
            Predicate::eq(
                schema.entity_id(),
                Column::qualified(edge.clone(), schema.object_column.clone()),
            ),
        )],
        vec![
            Predicate::eq(
                Column::qualified(edge.clone(), schema.subject_column.clone()),
                SqlValue::Unsigned(sender),
            ),
            Predicate::eq(
                Column::qualified(edge, schema.name_column.clone()),
                SqlValue::from("follows"),
            ),
            Predicate::negate(Predicate::eq(
                Column::qualified(schema.entity_alias.clone(), ident("banned")),
                SqlValue::Bool(true),
            )),
        ],
    )
}

#[test]
fn test_custom_schema_render_and_evaluate() {
    init_tracing();
    let schema = custom_schema();
    let mut store = RelationalStore::new(schema.clone());
    store
        .add_actor(&Actor::new(1))
        .add_actor(&Actor::new(2).with_attribute("banned", false))
        .add_actor(&Actor::new(3).with_attribute("banned", true))
        .add_actor(&Actor::new(4))
        .add_relationship(ActorId::new(1), "follows", ActorId::new(2))
        .add_relationship(ActorId::new(1), "follows", ActorId::new(3))
        .add_relationship(ActorId::new(1), "blocks", ActorId::new(4));

    let fragment = followed_by(&schema, 1);
    assert_eq!(store.select(&fragment).unwrap(), vec![ActorId::new(2)]);
    assert!(store.matches(&fragment, ActorId::new(2)).unwrap());
    assert!(!store.matches(&fragment, ActorId::new(99)).unwrap());

    let rendered = SqlRenderer::new(schema, Placeholder::Dollar)
        .unwrap()
        .with_param_offset(2)
        .render(&fragment);
    assert_eq!(rendered.joins, "JOIN app_edges f0 ON u.id = f0.dst");
    assert_eq!(
        rendered.wheres,
        "f0.src = $3 AND f0.kind = $4 AND NOT (u.banned = $5)"
    );
    assert_eq!(
        rendered.params,
        vec![SqlValue::Unsigned(1), SqlValue::from("follows"), SqlValue::Bool(true)]
    );
}

#[test]
fn test_disjunction_evaluates_like_union() {
    init_tracing();
    let mut store = RelationalStore::default();
    for id in 1..=4 {
        store.add_actor(&Actor::new(id).with_attribute("level", id as i64));
    }
    let level = |n: i64| {
        Predicate::eq(
            Column::qualified(ident("e"), ident("level")),
            SqlValue::Integer(n),
        )
    };

    let fragment = FilterFragment::new(Vec::new(), vec![Predicate::any(vec![level(1), level(3)])]);
    assert_eq!(
        store.select(&fragment).unwrap(),
        vec![ActorId::new(1), ActorId::new(3)]
    );

    let nobody = FilterFragment::new(Vec::new(), vec![Predicate::Or(Vec::new())]);
    assert!(store.select(&nobody).unwrap().is_empty());
}

proptest! {
    #[test]
    fn prop_bound_text_never_reaches_sql(text in ".*") {
        let fragment = FilterFragment::new(
            Vec::new(),
            vec![Predicate::eq(
                Column::qualified(ident("e"), ident("name")),
                SqlValue::from(text.as_str()),
            )],
        );
        let rendered = SqlRenderer::new(StoreSchema::default(), Placeholder::Question)
            .unwrap()
            .render(&fragment);

        prop_assert_eq!(rendered.wheres, "e.name = ?");
        prop_assert_eq!(rendered.params, vec![SqlValue::Text(text)]);
    }

    #[test]
    fn prop_inline_quoting_is_closed(text in ".*") {
        let quoted = DefaultSanitizer.quote_literal(&text);
        prop_assert!(quoted.starts_with('\'') && quoted.ends_with('\''));

        let inner = &quoted[1..quoted.len() - 1];
        prop_assert!(!inner.replace("''", "").contains('\''));
        prop_assert!(!inner.chars().any(char::is_control));
    }
}
