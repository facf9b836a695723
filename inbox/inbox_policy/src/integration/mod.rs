//! Integration with the relationship store.
//!
//! Pair checks need to ask whether a relationship exists. The store owns
//! relationships; policies only query them through `RelationshipGraph`.

mod graph;

pub use graph::RelationshipGraph;
