//! Integration tests for the inbox core library.
//!
//! These tests cover the shared vocabulary as other crates consume it:
//! actors deserialized from external data, identifiers parsed from text and
//! errors converted into the root type.

use std::str::FromStr;

use inbox_core::error::{ConfigError, Error, PolicyError, QueryError, Result};
use inbox_core::utils::LogLevel;
use inbox_core::{Actor, ActorId, ConfigValue};

#[test]
fn test_actor_from_json() {
    let actor: Actor = serde_json::from_str(
        r#"{"id": 42, "attributes": {"isMember": true, "roles": ["admin", "editor"], "karma": 17}}"#,
    )
    .unwrap();

    assert_eq!(actor.id, ActorId::new(42));
    assert!(actor.flag("isMember"));
    assert_eq!(
        actor.attribute("roles").and_then(ConfigValue::as_array).map(<[_]>::len),
        Some(2)
    );
    assert_eq!(actor.attribute("karma").and_then(ConfigValue::as_integer), Some(17));
}

#[test]
fn test_actor_id_parsing() {
    assert_eq!(ActorId::from_str(" 7 ").unwrap(), ActorId::new(7));
    assert!(ActorId::from_str("seven").is_err());
    assert!(ActorId::from_str("-1").is_err());
    assert_eq!(u64::from(ActorId::new(9)), 9);
}

fn failing(kind: &str) -> Result<()> {
    match kind {
        "policy" => Err(PolicyError::Sanitization {
            field: "recipient.relationship".to_string(),
            reason: "empty".to_string(),
        }
        .into()),
        "query" => Err(QueryError::UnknownAlias("rel9".to_string()).into()),
        _ => Err(ConfigError::Invalid(kind.to_string()).into()),
    }
}

#[test]
fn test_errors_propagate_through_root_type() {
    assert!(matches!(failing("policy"), Err(Error::Policy(_))));
    assert!(matches!(failing("query"), Err(Error::Query(_))));

    let err = failing("other").unwrap_err();
    assert_eq!(err.to_string(), "Config error: Invalid configuration: other");
}

#[test]
fn test_log_level_from_config_text() {
    let level: LogLevel = "warn".parse().unwrap();
    assert_eq!(level, LogLevel::Warning);
    assert!(level.is_at_least(LogLevel::Info));
    assert!(!level.is_at_least(LogLevel::Error));
}
