//! Policy engine.
//!
//! This module provides the resolved policy and the policy set that
//! aggregates several of them.

pub mod aggregator;
pub mod policy;

pub use aggregator::PolicySet;
pub use policy::Policy;
