//! Storage abstraction for swipe, match, and message records
//!
//! Trait-based abstraction over the backing document store. The trait is
//! synchronous (no async) and every operation is short; callers treat it
//! as a request-scoped collaborator, not a long-lived session.

mod chaotic;
mod error;
mod memory;

pub use chaotic::ChaoticStore;
pub use error::StoreError;
pub use memory::MemoryStore;

use crate::types::{MatchRecord, PairKey, RealIdentity, StoredMessage, SwipeRecord};

/// Result of a conditional match creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCreate {
    /// No record existed; this call created it
    Created,
    /// A record already existed; the existing record was left untouched
    AlreadyExists,
}

/// Storage abstraction for the matching domain
///
/// Must be Clone (handlers are stateless and share one store), Send + Sync
/// (thread-safe), and synchronous (no async methods). Implementations
/// typically share internal state via Arc, so clones access the same
/// underlying storage.
///
/// Missing records are expressed as `Ok(None)` / empty vectors, never as
/// errors; [`StoreError`] is reserved for genuine storage faults.
///
/// # Panics
///
/// Implementations may panic if internal synchronization primitives are
/// poisoned (a thread panicked while holding a lock). Acceptable for
/// test/simulation code, but production implementations should handle
/// poisoned mutexes gracefully.
pub trait Store: Clone + Send + Sync + 'static {
    /// Append a swipe record.
    ///
    /// Swipes are append-only; recording never overwrites earlier swipes
    /// between the same pair.
    fn record_swipe(&self, swipe: &SwipeRecord) -> Result<(), StoreError>;

    /// Most recent swipe from `from` toward `to`. `None` if none recorded.
    fn swipe_between(
        &self,
        from: &RealIdentity,
        to: &RealIdentity,
    ) -> Result<Option<SwipeRecord>, StoreError>;

    /// Conditionally create a match record under its canonical pair key.
    ///
    /// This is the one write that races: two concurrent opposite-direction
    /// right-swipes may both detect mutual consent. The create must be
    /// atomic at the storage boundary - if a record already exists the
    /// call returns [`MatchCreate::AlreadyExists`] and leaves the existing
    /// record (and its salt) untouched.
    ///
    /// # Invariants
    ///
    /// - Post: exactly one record exists for `key`, whichever caller won
    fn create_match_if_absent(
        &self,
        key: &PairKey,
        record: &MatchRecord,
    ) -> Result<MatchCreate, StoreError>;

    /// Match record for a pair. `None` if the pair never matched.
    fn match_for(&self, key: &PairKey) -> Result<Option<MatchRecord>, StoreError>;

    /// All match records `identity` is a member of.
    ///
    /// Bounds resolver scans: scope enumeration is O(matches of one user),
    /// never O(all users).
    fn matches_of(&self, identity: &RealIdentity) -> Result<Vec<MatchRecord>, StoreError>;

    /// Append a message to a pair's conversation.
    fn store_message(&self, key: &PairKey, message: &StoredMessage) -> Result<(), StoreError>;

    /// All messages in a pair's conversation, in stored order.
    fn messages_between(&self, key: &PairKey) -> Result<Vec<StoredMessage>, StoreError>;
}
