//! # Inbox Core
//!
//! `inbox_core` provides the shared building blocks for the inbox messaging
//! policy crates: the error hierarchy, actor identifiers, the actor model
//! consulted by category validators, and small configuration and logging
//! utilities.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all inbox components
//! - **id**: Strongly-typed actor identifiers
//! - **types**: Data structures shared between the query and policy crates
//! - **utils**: Configuration values and logging helpers

pub mod error;
pub mod id;
pub mod types;
pub mod utils;

// Re-export key types for convenience
pub use error::{Error, Result};
pub use id::ActorId;
pub use types::Actor;
pub use utils::{ConfigValue, LogLevel};
