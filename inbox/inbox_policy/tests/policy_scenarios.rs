//! Integration tests for policy scenarios.
//!
//! These tests exercise policies built from rules and a registry against
//! rendered SQL and the in-memory relational store.

use inbox_core::{Actor, ActorId};
use inbox_policy::{FnActorType, InMemoryTypeRegistry, Policy, PolicyRule};
use inbox_query::{
    AliasAllocator, CandidateClauses, Clauses, Column, FilterFragment, Ident, Placeholder,
    Predicate, RelationalStore, SqlRenderer, SqlValue, StoreSchema,
};
use std::collections::HashSet;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// `member` validates on the `isMember` flag and filters on the column of
/// the same name.
fn registry() -> InMemoryTypeRegistry {
    let registry = InMemoryTypeRegistry::new();
    registry
        .register(
            "member",
            FnActorType::new()
                .with_validator(|actor, _| actor.flag("isMember"))
                .with_getter(|_| {
                    CandidateClauses::wheres(Clauses::Many(vec![Predicate::eq(
                        Column::qualified(
                            Ident::new("e").expect("alias"),
                            Ident::new("isMember").expect("column"),
                        ),
                        SqlValue::Bool(true),
                    )]))
                }),
        )
        .expect("register member");
    registry
        .register(
            "moderator",
            FnActorType::new().with_validator(|actor, _| actor.flag("moderator")),
        )
        .expect("register moderator");
    registry
}

#[test]
fn test_open_policy_allows_everyone() {
    init_tracing();
    let policy = Policy::new(PolicyRule::new(), &registry()).unwrap();
    let aliases = AliasAllocator::new();

    for id in [1, 2, 99] {
        let actor = Actor::new(id);
        assert!(policy.validate_sender_type(&actor));
        assert!(policy.validate_recipient_type(&actor));
        assert!(policy.recipient_filter(&actor, &aliases).is_empty());
    }
    assert_eq!(aliases.peek(), 0);
}

#[test]
fn test_member_recipient_scenario() {
    init_tracing();
    let rule = PolicyRule::new()
        .with_recipient("member")
        .with_relationship("friend");
    let policy = Policy::new(rule, &registry()).unwrap();

    let outsider = Actor::new(1).with_attribute("isMember", false);
    let member = Actor::new(2).with_attribute("isMember", true);
    assert!(!policy.validate_recipient_type(&outsider));
    assert!(policy.validate_recipient_type(&member));
}

#[test]
fn test_validator_is_consulted_for_sender() {
    let rule = PolicyRule::new().with_sender("moderator");
    let policy = Policy::new(rule, &registry()).unwrap();

    assert!(policy.validate_sender_type(&Actor::new(1).with_attribute("moderator", true)));
    assert!(!policy.validate_sender_type(&Actor::new(1).with_attribute("moderator", false)));
    assert!(!policy.validate_sender_type(&Actor::new(1)));
}

#[test]
fn test_fail_closed_validation_and_fail_open_filtering() {
    // No getter for moderators: bulk filtering cannot narrow, but a pair
    // check still refuses non-moderators.
    let policy = Policy::new(PolicyRule::new().with_recipient("moderator"), &registry()).unwrap();
    assert!(policy.recipient_clauses().is_empty());
    assert!(!policy.validate_recipient_type(&Actor::new(5)));

    // Unknown categories have neither capability.
    let policy = Policy::new(
        PolicyRule::new()
            .with_sender("nobody")
            .with_recipient("nobody"),
        &registry(),
    )
    .unwrap();
    assert!(!policy.validate_sender_type(&Actor::new(5)));
    assert!(!policy.validate_recipient_type(&Actor::new(5)));
    assert!(policy.recipient_clauses().is_empty());
}

#[test]
fn test_direction_of_sender_constraint() {
    let schema = StoreSchema::default();
    let renderer = SqlRenderer::new(schema, Placeholder::Question).unwrap();
    let aliases = AliasAllocator::new();
    let sender = Actor::new(7);

    let forward = Policy::new(PolicyRule::new().with_relationship("friend"), &registry())
        .unwrap()
        .relationship_clauses(&sender, &aliases);
    let rendered = renderer.render(&forward);
    assert_eq!(rendered.joins, "JOIN entity_relationships rel0 ON e.guid = rel0.guid_two");
    assert_eq!(rendered.wheres, "rel0.guid_one = ? AND rel0.relationship = ?");
    assert_eq!(
        rendered.params,
        vec![SqlValue::Unsigned(7), SqlValue::from("friend")]
    );

    let inverse = Policy::new(
        PolicyRule::new().with_inverse_relationship("friend"),
        &registry(),
    )
    .unwrap()
    .relationship_clauses(&sender, &aliases);
    let rendered = renderer.render(&inverse);
    assert_eq!(rendered.joins, "JOIN entity_relationships rel1 ON e.guid = rel1.guid_one");
    assert_eq!(rendered.wheres, "rel1.guid_two = ? AND rel1.relationship = ?");
    assert_eq!(rendered.params[0], SqlValue::Unsigned(7));
}

#[test]
fn test_shared_group_selects_expected_candidates() {
    init_tracing();
    let mut store = RelationalStore::default();
    for id in [1, 2, 3, 4, 5, 42] {
        store.add_actor(&Actor::new(id));
    }
    store
        .add_relationship(ActorId::new(42), "group_member", ActorId::new(100))
        .add_relationship(ActorId::new(42), "group_member", ActorId::new(101))
        .add_relationship(ActorId::new(1), "group_member", ActorId::new(100))
        .add_relationship(ActorId::new(2), "group_member", ActorId::new(101))
        .add_relationship(ActorId::new(2), "group_member", ActorId::new(100))
        .add_relationship(ActorId::new(3), "group_member", ActorId::new(102))
        .add_relationship(ActorId::new(4), "follower", ActorId::new(100));

    let policy = Policy::new(
        PolicyRule::new().with_group_relationship("group_member"),
        &registry(),
    )
    .unwrap();
    let fragment = policy.group_relationship_clauses(&Actor::new(42), &AliasAllocator::new());

    let selected = store.select(&fragment).unwrap();
    assert_eq!(
        selected,
        vec![ActorId::new(1), ActorId::new(2), ActorId::new(42)]
    );

    for id in [1, 2, 3, 4, 5] {
        let candidate = Actor::new(id);
        assert_eq!(
            policy.permits(&Actor::new(42), &candidate, &store),
            selected.contains(&candidate.id),
            "candidate {}",
            id
        );
    }
}

#[test]
fn test_recipient_filter_combines_all_constraints() {
    let mut store = RelationalStore::default();
    store
        .add_actor(&Actor::new(1))
        .add_actor(&Actor::new(2).with_attribute("isMember", true))
        .add_actor(&Actor::new(3).with_attribute("isMember", true))
        .add_actor(&Actor::new(4).with_attribute("isMember", false))
        .add_relationship(ActorId::new(2), "friend", ActorId::new(1))
        .add_relationship(ActorId::new(4), "friend", ActorId::new(1))
        .add_relationship(ActorId::new(3), "colleague", ActorId::new(1));

    // Members who have befriended the sender.
    let policy = Policy::new(
        PolicyRule::new()
            .with_recipient("member")
            .with_inverse_relationship("friend"),
        &registry(),
    )
    .unwrap();
    let fragment = policy.recipient_filter(&Actor::new(1), &AliasAllocator::new());
    assert_eq!(store.select(&fragment).unwrap(), vec![ActorId::new(2)]);
}

#[test]
fn test_concurrent_aliases_are_unique() {
    let registry = registry();
    let policies: Vec<Arc<Policy>> = (0..4)
        .map(|i| {
            let rule = if i % 2 == 0 {
                PolicyRule::new().with_relationship("friend")
            } else {
                PolicyRule::new().with_group_relationship("group_member")
            };
            Arc::new(Policy::new(rule, &registry).unwrap())
        })
        .collect();
    let aliases = AliasAllocator::new();

    let fragments: Vec<FilterFragment> = std::thread::scope(|scope| {
        let handles: Vec<_> = policies
            .iter()
            .map(|policy| {
                let aliases = &aliases;
                scope.spawn(move || {
                    (0..100)
                        .map(|i| policy.recipient_filter(&Actor::new(i), aliases))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    let mut seen = HashSet::new();
    for alias in fragments.iter().flat_map(FilterFragment::aliases) {
        assert!(seen.insert(alias.clone()), "duplicate alias {}", alias);
    }
    assert_eq!(seen.len(), 400);
    assert_eq!(aliases.peek(), 400);
}

#[test]
fn test_global_allocator_aliases_are_unique() {
    let policy = Policy::new(PolicyRule::new().with_relationship("friend"), &registry()).unwrap();
    let first = policy.relationship_clauses(&Actor::new(1), AliasAllocator::global());
    let second = policy.relationship_clauses(&Actor::new(1), AliasAllocator::global());
    assert_ne!(first.joins[0].alias, second.joins[0].alias);
}
