//! Integration tests for loading policies from TOML configuration.

use inbox_core::error::{ConfigError, Error};
use inbox_core::{Actor, ActorId};
use inbox_policy::InboxConfig;
use inbox_query::{AliasAllocator, Placeholder, RelationalStore};
use std::fs;

const CONFIG: &str = r#"
log_level = "info"
placeholder = "question"

[actor_types.member]
attribute = "is_member"
value = true

[actor_types.admin]
attribute = "roles"
value = "admin"
bulk_filter = false

[[policies]]
id = "admins-to-anyone"
description = "Administrators may message anyone"
sender = "admin"

[[policies]]
id = "members-to-friends"
sender = "member"
recipient = "member"
relationship = "friend"
"#;

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inbox.toml");
    fs::write(&path, CONFIG).unwrap();

    let config = InboxConfig::from_file(&path).unwrap();
    assert_eq!(config.placeholder, Placeholder::Question);
    assert_eq!(config.actor_types.len(), 2);

    let registry = config.build_registry().unwrap();
    assert_eq!(registry.categories(), vec!["admin", "member"]);

    let policies = config.build_policies(&registry).unwrap();
    assert_eq!(policies.len(), 2);
    assert_eq!(policies.iter().next().unwrap().id(), Some("admins-to-anyone"));
}

#[test]
fn test_configured_policies_select_recipients() {
    let config = InboxConfig::from_toml_str(CONFIG).unwrap();
    let registry = config.build_registry().unwrap();
    let policies = config.build_policies(&registry).unwrap();

    let admin = Actor::new(1).with_attribute("roles", vec!["admin", "editor"]);
    let alice = Actor::new(2).with_attribute("is_member", true);
    let bob = Actor::new(3).with_attribute("is_member", true);
    let carol = Actor::new(4).with_attribute("is_member", false);

    let mut store = RelationalStore::new(config.store.clone());
    for actor in [&admin, &alice, &bob, &carol] {
        store.add_actor(actor);
    }
    store
        .add_relationship(alice.id, "friend", bob.id)
        .add_relationship(alice.id, "friend", carol.id);

    let aliases = AliasAllocator::new();
    assert_eq!(
        policies.select_recipients(&alice, &store, &aliases).unwrap(),
        vec![bob.id]
    );
    assert_eq!(
        policies.select_recipients(&admin, &store, &aliases).unwrap(),
        vec![ActorId::new(1), ActorId::new(2), ActorId::new(3), ActorId::new(4)]
    );
    assert!(policies
        .select_recipients(&carol, &store, &aliases)
        .unwrap()
        .is_empty());

    assert!(policies.permits_any(&alice, &bob, &store));
    assert!(!policies.permits_any(&alice, &carol, &store));
    assert!(!policies.permits_any(&bob, &alice, &store));
    assert!(policies.permits_any(&admin, &carol, &store));
}

#[test]
fn test_rendered_filters_use_placeholders() {
    let config = InboxConfig::from_toml_str(CONFIG).unwrap();
    let registry = config.build_registry().unwrap();
    let policies = config.build_policies(&registry).unwrap();
    let renderer = config.renderer().unwrap();

    let alice = Actor::new(2).with_attribute("is_member", true);
    let filters = policies.recipient_filters(&alice, &AliasAllocator::new());
    assert_eq!(filters.len(), 1);

    let rendered = renderer.render(&filters[0]);
    assert_eq!(
        rendered.joins,
        "JOIN entity_relationships rel0 ON e.guid = rel0.guid_two"
    );
    assert_eq!(
        rendered.wheres,
        "e.is_member = ? AND (rel0.guid_one = ? AND rel0.relationship = ?)"
    );
    assert_eq!(rendered.params.len(), 3);
}

#[test]
fn test_malformed_rules_are_rejected() {
    let err = InboxConfig::from_toml_str("[[policies]]\ninverse_relationship = \"yes\"\n")
        .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));

    let err = InboxConfig::from_toml_str("[[policies]]\nrecipients = \"member\"\n").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));

    let err = InboxConfig::from_toml_str("[actor_types.member]\nattribute = \"is member\"\nvalue = true\n")
        .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = InboxConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
