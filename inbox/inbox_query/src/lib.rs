//! # Inbox Query
//!
//! `inbox_query` is the query-building side of the inbox messaging policy.
//! Policies do not produce SQL strings directly; they produce structured
//! filter fragments which this crate can:
//!
//! 1. **Compose**: fragments are AND-merged, joins are concatenated and
//!    where-predicates are conjoined.
//!
//! 2. **Render**: `SqlRenderer` turns a fragment into join and where SQL
//!    text with bound parameters, so no externally supplied value is ever
//!    interpolated into the query.
//!
//! 3. **Evaluate**: `RelationalStore` evaluates a fragment against
//!    in-memory rows, which lets tests check that a fragment selects exactly
//!    the expected candidates.
//!
//! Table aliases for joined relationship tables come from an
//! `AliasAllocator`, which guarantees that fragments embedded in the same
//! query never collide.

pub mod alias;
pub mod eval;
pub mod expr;
pub mod fragment;
pub mod ident;
pub mod render;
pub mod sanitize;
pub mod schema;
pub mod value;

// Re-export key types for convenience
pub use alias::AliasAllocator;
pub use eval::RelationalStore;
pub use expr::{Column, Operand, Predicate, Subquery};
pub use fragment::{CandidateClauses, Clauses, FilterFragment, Join};
pub use ident::Ident;
pub use render::{Placeholder, RenderedFragment, SqlRenderer};
pub use sanitize::{DefaultSanitizer, Sanitizer};
pub use schema::StoreSchema;
pub use value::SqlValue;
