//! Policy models.
//!
//! This module defines the rule description and the category bindings a
//! policy resolves it into.

pub mod binding;
pub mod rule;

pub use binding::CategoryBinding;
pub use rule::{ActorCategory, PolicyRule};
