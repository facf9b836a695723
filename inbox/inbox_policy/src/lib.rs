//! # Inbox Policy
//!
//! `inbox_policy` decides whether a message may pass from a sender to a
//! recipient, and produces query filters that find every allowed recipient
//! of a sender in bulk.
//!
//! Key concepts:
//!
//! 1. **Policy Rule**: A declarative description of who may message whom:
//!    the sender and recipient categories, an optional relationship that
//!    must link them (in either direction), and an optional relationship
//!    through which they must share a group.
//!
//! 2. **Actor Type**: A category of actors, supplied by a registry. A type
//!    may be able to validate a single actor, produce bulk candidate
//!    filters, both, or neither.
//!
//! 3. **Policy**: A rule resolved against the registry. It answers "may this
//!    pair communicate?" and "which recipients may this sender reach?" with
//!    the same logic.
//!
//! 4. **Policy Set**: The policies that apply to one kind of message; a pair
//!    is allowed if any of them allows it.

pub mod config;
pub mod engine;
pub mod integration;
pub mod model;
pub mod registry;

// Re-export key types and traits for convenience
pub use config::InboxConfig;
pub use engine::{Policy, PolicySet};
pub use integration::RelationshipGraph;
pub use model::{ActorCategory, CategoryBinding, PolicyRule};
pub use registry::{
    ActorType, AttributeActorType, FnActorType, InMemoryTypeRegistry, TypeRegistry,
    UnregisteredType,
};
