//! Utility functions and types.
//!
//! This module provides the configuration value type used for actor
//! attributes and declarative actor types, plus logging helpers.

pub mod config;
pub mod logging;

pub use config::ConfigValue;
pub use logging::{init_logging, LogLevel};
