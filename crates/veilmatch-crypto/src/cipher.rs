//! Message encryption using `XChaCha20-Poly1305`
//!
//! All functions are pure - random bytes must be provided by the caller.
//! This enables deterministic testing.
//!
//! Decryption is deliberately tolerant: message corpora contain a mix of
//! encrypted and legacy plaintext bodies, so any decryption failure returns
//! the input unchanged instead of erroring. The [`looks_encrypted`]
//! heuristic decides whether an unflagged body is worth a decryption
//! attempt at all; an explicit encrypted flag on the stored record is
//! always authoritative over the heuristic.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};

use crate::conversation::ConversationKey;

/// Size of the `XChaCha20` nonce prefixed to the ciphertext (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
const POLY1305_TAG_SIZE: usize = 16;

/// Minimum length beyond which a body is heuristically treated as
/// ciphertext (strictly greater than this value)
const HEURISTIC_MIN_LEN: usize = 50;

/// Result of a tolerant decryption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptOutcome {
    /// Authentication succeeded; the recovered plaintext
    Plaintext(String),
    /// Decryption failed; carries the input unchanged
    Miss(String),
}

impl DecryptOutcome {
    /// The text to show regardless of outcome: plaintext on success, the
    /// untouched input on a miss.
    pub fn into_text(self) -> String {
        match self {
            Self::Plaintext(text) | Self::Miss(text) => text,
        }
    }

    /// True if decryption failed and the input was passed through.
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss(_))
    }
}

/// Encrypt a message for a conversation.
///
/// Wire format is `base64(nonce || aead_ciphertext)` where the nonce is the
/// caller-provided 24 bytes. The caller MUST supply cryptographically
/// secure random bytes in production; a repeated nonce under the same key
/// breaks confidentiality.
pub fn encrypt_message(plaintext: &str, key: &ConversationKey, nonce: [u8; NONCE_SIZE]) -> String {
    let cipher = XChaCha20Poly1305::new(key.key().into());

    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(&nonce), plaintext.as_bytes()) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    let mut wire = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    wire.extend_from_slice(&nonce);
    wire.extend_from_slice(&ciphertext);

    BASE64.encode(wire)
}

/// Decrypt a message, tolerating non-ciphertext input.
///
/// Attempts base64 decode, nonce split, and AEAD open. Any failure - bad
/// encoding, truncated input, authentication mismatch, non-UTF-8 output -
/// yields [`DecryptOutcome::Miss`] carrying the input unchanged. Never
/// errors, never panics.
pub fn decrypt_message(ciphertext: &str, key: &ConversationKey) -> DecryptOutcome {
    let miss = || DecryptOutcome::Miss(ciphertext.to_string());

    let Ok(wire) = BASE64.decode(ciphertext) else {
        return miss();
    };

    if wire.len() < NONCE_SIZE + POLY1305_TAG_SIZE {
        return miss();
    }

    let (nonce, body) = wire.split_at(NONCE_SIZE);
    let cipher = XChaCha20Poly1305::new(key.key().into());

    let Ok(plaintext) = cipher.decrypt(XNonce::from_slice(nonce), body) else {
        return miss();
    };

    match String::from_utf8(plaintext) {
        Ok(text) => DecryptOutcome::Plaintext(text),
        Err(_) => miss(),
    }
}

/// Heuristic: does this body look like ciphertext?
///
/// True when the text is longer than 50 characters and consists entirely
/// of base64 alphabet characters. Governs opportunistic decryption of
/// messages stored before the encrypted flag existed; a present flag
/// always wins over this guess.
pub fn looks_encrypted(text: &str) -> bool {
    text.len() > HEURISTIC_MIN_LEN
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
}
