//! Table alias allocation.
//!
//! Every fragment that joins the relationship table needs its own alias so
//! that several fragments, possibly produced by different policies, can be
//! spliced into one query. An allocator hands out `<prefix><n>` names from a
//! single atomic counter, so aliases never repeat for the lifetime of the
//! allocator regardless of prefix or calling thread.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ident::Ident;

/// Prefix for aliases of direct relationship joins.
pub const RELATIONSHIP_PREFIX: &str = "rel";

/// Prefix for aliases of shared-group relationship joins.
pub const GROUP_RELATIONSHIP_PREFIX: &str = "gerel";

static GLOBAL: AliasAllocator = AliasAllocator::new();

/// Issues unique table aliases.
#[derive(Debug, Default)]
pub struct AliasAllocator {
    next: AtomicU64,
}

impl AliasAllocator {
    /// Create an allocator starting at zero.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create an allocator whose first alias uses `n`.
    ///
    /// Useful when a query already contains aliases numbered below `n`.
    pub const fn starting_at(n: u64) -> Self {
        Self {
            next: AtomicU64::new(n),
        }
    }

    /// The process-wide allocator.
    ///
    /// Callers without a per-query allocator can share this one; it is never
    /// reset.
    pub fn global() -> &'static AliasAllocator {
        &GLOBAL
    }

    /// Allocate the next alias with the given prefix.
    ///
    /// # Panics
    ///
    /// In debug builds, if `prefix` is not a valid identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use inbox_query::AliasAllocator;
    ///
    /// let aliases = AliasAllocator::new();
    /// assert_eq!(aliases.allocate("rel").as_str(), "rel0");
    /// assert_eq!(aliases.allocate("gerel").as_str(), "gerel1");
    /// ```
    pub fn allocate(&self, prefix: &'static str) -> Ident {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Ident::from_trusted(format!("{}{}", prefix, n))
    }

    /// Number that the next allocation will use.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
