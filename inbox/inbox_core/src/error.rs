//! Error types for the inbox messaging policy.
//!
//! Errors are organized by subsystem, with each subsystem having its own
//! error type. The root error type, `Error`, can wrap any of them so that
//! callers can handle failures uniformly.
//!
//! Note that missing capabilities (an unregistered actor category, an actor
//! type without a validator) are never errors: they are resolved by the
//! fail-closed and fail-open rules of the policy itself.

use thiserror::Error;

/// Root error type for the inbox crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Policy construction errors
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Actor type registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Query fragment building and evaluation errors
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Configuration loading errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to policy construction.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A relationship name could not be made safe for embedding
    #[error("Sanitization failed for {field}: {reason}")]
    Sanitization {
        /// The rule field that failed
        field: String,

        /// Why the value was rejected
        reason: String,
    },
}

/// Errors related to the actor type registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An actor type with this name is already registered
    #[error("Actor type already registered: {0}")]
    Conflict(String),

    /// No actor type with this name is registered
    #[error("Actor type not found: {0}")]
    TypeNotFound(String),
}

/// Errors related to query fragments.
#[derive(Debug, Error)]
pub enum QueryError {
    /// An identifier is not safe to embed in a query
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A literal is empty or unusable once control characters are removed
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    /// A predicate references an alias that no join or outer row binds
    #[error("Unknown alias: {0}")]
    UnknownAlias(String),

    /// A join or subquery references a table the store does not hold
    #[error("Unknown table: {0}")]
    UnknownTable(String),
}

/// Errors related to configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// The configuration parsed but describes something unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type used throughout the inbox crates.
pub type Result<T> = std::result::Result<T, Error>;
