//! Strongly-typed identifiers.
//!
//! Actors are stored by the external entity store, which hands out stable
//! numeric identifiers (the `guid` column of the entity tables). `ActorId`
//! wraps that number so it cannot be confused with other integers, such as
//! table aliases or parameter positions, when building query fragments.
//!
//! # Examples
//!
//! ```
//! use inbox_core::id::ActorId;
//! use std::str::FromStr;
//!
//! let id = ActorId::new(42);
//! assert_eq!(id.get(), 42);
//! assert_eq!(id.to_string(), "42");
//!
//! let parsed = ActorId::from_str("42").unwrap();
//! assert_eq!(parsed, id);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of an actor in the entity store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(u64);

impl ActorId {
    /// Wrap a raw store identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw store identifier.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ActorId> for u64 {
    fn from(id: ActorId) -> Self {
        id.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActorId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}
