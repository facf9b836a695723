//! Data structures shared across the inbox crates.

pub mod actor;

pub use actor::Actor;
