//! Domain record types.
//!
//! Stored records are immutable once written: swipes are append-only facts,
//! match records are created exactly once per pair and never mutated. The
//! canonical [`PairKey`] fixes one storage identity for every unordered
//! pair so both parties address the same match and conversation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Size of the per-conversation salt in bytes (256 bits)
pub const SALT_SIZE: usize = 32;

/// Durable, sensitive account identifier (e.g. the account email).
///
/// Never exposed to other parties except its holder; external surfaces see
/// only the derived [`veilmatch_crypto::OpaqueId`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RealIdentity(String);

impl RealIdentity {
    /// Construct from the raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RealIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RealIdentity {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RealIdentity {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Direction of an expressed preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwipeDirection {
    /// Rejection
    Left,
    /// Interest
    Right,
}

/// One-directional expressed preference from one identity toward another.
///
/// Created once per swipe, immutable, append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeRecord {
    /// Identity that swiped
    pub from: RealIdentity,
    /// Identity that was swiped on
    pub to: RealIdentity,
    /// Expressed preference
    pub direction: SwipeDirection,
    /// Unix timestamp (seconds) when the swipe was recorded
    pub timestamp_secs: u64,
}

/// Canonical key for an unordered identity pair.
///
/// Both orderings of the same two identities produce the same key, so
/// match records and conversations are addressed identically by either
/// party.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    lo: RealIdentity,
    hi: RealIdentity,
}

impl PairKey {
    /// Build the canonical key for two identities.
    pub fn new(a: &RealIdentity, b: &RealIdentity) -> Self {
        if a <= b {
            Self { lo: a.clone(), hi: b.clone() }
        } else {
            Self { lo: b.clone(), hi: a.clone() }
        }
    }

    /// The pair in canonical (sorted) order.
    pub fn users(&self) -> [&RealIdentity; 2] {
        [&self.lo, &self.hi]
    }

    /// The counterpart of `identity` in this pair, if it is a member.
    pub fn counterpart_of(&self, identity: &RealIdentity) -> Option<&RealIdentity> {
        if *identity == self.lo {
            Some(&self.hi)
        } else if *identity == self.hi {
            Some(&self.lo)
        } else {
            None
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lo, self.hi)
    }
}

/// Canonical record of mutual consent between two identities.
///
/// Created exactly once, when a right-swipe is recorded and a prior
/// right-swipe from the target back to the swiper already exists. Solely
/// owns the conversation salt; the salt is fixed at creation and immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// The matched pair, in canonical (sorted) order
    pub users: [RealIdentity; 2],
    /// Unix timestamp (seconds) when the match was created
    pub created_at_secs: u64,
    /// Per-conversation random secret fixing the encryption key
    pub salt: [u8; SALT_SIZE],
}

impl MatchRecord {
    /// Create a record for the given pair.
    pub fn new(key: &PairKey, created_at_secs: u64, salt: [u8; SALT_SIZE]) -> Self {
        let [lo, hi] = key.users();
        Self { users: [lo.clone(), hi.clone()], created_at_secs, salt }
    }

    /// The canonical key this record is stored under.
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.users[0], &self.users[1])
    }

    /// The counterpart of `identity` in this match, if it is a member.
    pub fn counterpart_of(&self, identity: &RealIdentity) -> Option<&RealIdentity> {
        if *identity == self.users[0] {
            Some(&self.users[1])
        } else if *identity == self.users[1] {
            Some(&self.users[0])
        } else {
            None
        }
    }
}

/// A stored conversation message.
///
/// Bodies written by current code are encrypted and flagged; unflagged
/// rows predate the encrypted flag and may be plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Sender identity
    pub from: RealIdentity,
    /// Message body: ciphertext when `is_encrypted`, otherwise whatever
    /// the legacy writer stored
    pub body: String,
    /// Unix timestamp (seconds) when the message was stored
    pub timestamp_secs: u64,
    /// Whether `body` is known to be ciphertext (authoritative when set)
    pub is_encrypted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_order_independent() {
        let alice = RealIdentity::from("alice@example.com");
        let bob = RealIdentity::from("bob@example.com");

        assert_eq!(PairKey::new(&alice, &bob), PairKey::new(&bob, &alice));
    }

    #[test]
    fn pair_key_users_are_sorted() {
        let alice = RealIdentity::from("alice@example.com");
        let bob = RealIdentity::from("bob@example.com");

        let key = PairKey::new(&bob, &alice);
        assert_eq!(key.users(), [&alice, &bob]);
    }

    #[test]
    fn pair_key_counterpart() {
        let alice = RealIdentity::from("alice@example.com");
        let bob = RealIdentity::from("bob@example.com");
        let carol = RealIdentity::from("carol@example.com");

        let key = PairKey::new(&alice, &bob);
        assert_eq!(key.counterpart_of(&alice), Some(&bob));
        assert_eq!(key.counterpart_of(&bob), Some(&alice));
        assert_eq!(key.counterpart_of(&carol), None);
    }

    #[test]
    fn match_record_counterpart() {
        let alice = RealIdentity::from("alice@example.com");
        let bob = RealIdentity::from("bob@example.com");

        let key = PairKey::new(&alice, &bob);
        let record = MatchRecord::new(&key, 1_700_000_000, [0u8; SALT_SIZE]);

        assert_eq!(record.counterpart_of(&alice), Some(&bob));
        assert_eq!(record.pair_key(), key);
    }

    #[test]
    fn distinct_pairs_have_distinct_keys() {
        let alice = RealIdentity::from("alice@example.com");
        let bob = RealIdentity::from("bob@example.com");
        let carol = RealIdentity::from("carol@example.com");

        assert_ne!(PairKey::new(&alice, &bob), PairKey::new(&alice, &carol));
    }
}
