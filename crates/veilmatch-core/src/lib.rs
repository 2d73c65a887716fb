//! Veilmatch domain core.
//!
//! Pure domain logic for the consent-gated matching system: immutable
//! swipe/match/message records, a synchronous storage abstraction with an
//! in-memory implementation, the relationship state resolver, the photo and
//! profile access gates, and the identity resolver with its injectable
//! pseudonym cache.
//!
//! # Architecture
//!
//! Everything here is a pure function of the current record set plus the
//! crypto primitives in [`veilmatch_crypto`]. Handlers are stateless: the
//! relationship facts and access decisions are recomputed per request, and
//! the identity cache is nothing but memoization of a deterministic hash.
//! The single genuine write race - two concurrent opposite-direction
//! right-swipes both detecting mutual consent - is resolved by the
//! storage boundary's conditional create, never by an in-process lock.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod access;
pub mod relationship;
pub mod resolver;
pub mod storage;
pub mod types;

pub use access::{can_view_photo, can_view_profile};
pub use relationship::{RelationshipState, relationship_state};
pub use resolver::{IdentityCache, IdentityResolver, MemoryCache, ResolveScope};
pub use storage::{ChaoticStore, MatchCreate, MemoryStore, Store, StoreError};
pub use types::{MatchRecord, PairKey, RealIdentity, StoredMessage, SwipeDirection, SwipeRecord};
