//! Conversation key derivation using HKDF
//!
//! Each matched pair shares one symmetric key derived from the sorted
//! identity pair and the per-conversation salt fixed at match creation.
//! The key is recomputed on every operation and never persisted.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

/// Domain separation label for conversation keys
const CONVERSATION_LABEL: &[u8] = b"veilmatchConversationV1";

/// Size of a conversation key in bytes
pub const KEY_SIZE: usize = 32;

/// Symmetric key for one conversation.
///
/// Derived, used, and dropped within a single operation. Key material is
/// zeroed on drop.
#[derive(Clone)]
pub struct ConversationKey {
    key: [u8; KEY_SIZE],
}

impl ConversationKey {
    /// 32-byte symmetric key for XChaCha20-Poly1305 AEAD.
    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl Drop for ConversationKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.write_str("ConversationKey(..)")
    }
}

/// Derive the symmetric key for a conversation between two identities.
///
/// The pair is normalized by lexicographic sort before derivation, so the
/// result is identical regardless of which party is sender or recipient.
/// The salt is the HKDF salt; without it the key is infeasible to derive
/// even knowing both identities.
///
/// # Security
///
/// - Symmetric: `derive(a, b, salt) == derive(b, a, salt)`
/// - Salt-bound: distinct salts yield unrelated keys for the same pair
/// - Deterministic: same inputs always produce the same key
pub fn derive_conversation_key(a: &str, b: &str, salt: &[u8]) -> ConversationKey {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };

    // NUL separator keeps the identity boundary unambiguous
    let mut ikm = Vec::with_capacity(first.len() + second.len() + 1);
    ikm.extend_from_slice(first.as_bytes());
    ikm.push(0);
    ikm.extend_from_slice(second.as_bytes());

    let hkdf = Hkdf::<Sha256>::new(Some(salt), &ikm);

    let mut key = [0u8; KEY_SIZE];
    let Ok(()) = hkdf.expand(CONVERSATION_LABEL, &mut key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };
    ikm.zeroize();

    ConversationKey { key }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_produces_32_byte_key() {
        let key = derive_conversation_key("alice@example.com", "bob@example.com", &[0u8; 32]);
        assert_eq!(key.key().len(), KEY_SIZE);
    }

    #[test]
    fn derive_is_symmetric() {
        let salt = [7u8; 32];

        let ab = derive_conversation_key("alice@example.com", "bob@example.com", &salt);
        let ba = derive_conversation_key("bob@example.com", "alice@example.com", &salt);

        assert_eq!(ab.key(), ba.key(), "key must not depend on argument order");
    }

    #[test]
    fn derive_is_deterministic() {
        let salt = [7u8; 32];

        let k1 = derive_conversation_key("alice@example.com", "bob@example.com", &salt);
        let k2 = derive_conversation_key("alice@example.com", "bob@example.com", &salt);

        assert_eq!(k1.key(), k2.key());
    }

    #[test]
    fn different_salts_produce_different_keys() {
        let k1 = derive_conversation_key("alice@example.com", "bob@example.com", &[1u8; 32]);
        let k2 = derive_conversation_key("alice@example.com", "bob@example.com", &[2u8; 32]);

        assert_ne!(k1.key(), k2.key(), "salt must isolate conversations");
    }

    #[test]
    fn different_pairs_produce_different_keys() {
        let salt = [7u8; 32];

        let ab = derive_conversation_key("alice@example.com", "bob@example.com", &salt);
        let ac = derive_conversation_key("alice@example.com", "carol@example.com", &salt);

        assert_ne!(ab.key(), ac.key());
    }

    #[test]
    fn identity_boundary_is_unambiguous() {
        let salt = [7u8; 32];

        // Same concatenated bytes, different split points
        let k1 = derive_conversation_key("ab", "c", &salt);
        let k2 = derive_conversation_key("a", "bc", &salt);

        assert_ne!(k1.key(), k2.key());
    }

    #[test]
    fn works_with_empty_salt() {
        // Degenerate but must not panic; missing-salt handling is a policy
        // decision above this layer
        let key = derive_conversation_key("alice@example.com", "bob@example.com", &[]);
        assert_eq!(key.key().len(), KEY_SIZE);
    }
}
