//! Veilmatch Cryptographic Primitives
//!
//! Cryptographic building blocks for Veilmatch. Pure functions with
//! deterministic outputs. Callers provide random bytes (nonces, salts) for
//! deterministic testing.
//!
//! # Key Lifecycle
//!
//! Identities are never exposed raw: each durable account identifier is
//! pseudonymized into an opaque 128-bit id with a keyed hash under the
//! server secret. Conversations are keyed independently: a per-conversation
//! salt fixed at match creation feeds HKDF together with the sorted identity
//! pair, producing a symmetric key that is recomputed per operation and
//! never stored.
//!
//! ```text
//! Server Secret ──HMAC──▶ Opaque Id (per identity, stable)
//!
//! Sorted Identity Pair + Match Salt
//!        │
//!        ▼
//! HKDF → Conversation Key (per conversation, never persisted)
//!        │
//!        ▼
//! AEAD Encryption → Ciphertext (base64, nonce-prefixed)
//! ```
//!
//! # Security
//!
//! Pseudonym stability:
//! - Opaque ids are deterministic under a fixed server secret, so they
//!   survive process restarts and cache loss
//! - Reversal requires the server secret; the mapping is one-way for
//!   anyone who only sees opaque ids
//!
//! Conversation isolation:
//! - The match salt is required input to key derivation; knowing both
//!   identities without the salt does not yield the key
//! - Distinct salts produce unrelated keys even for the same pair
//!
//! Authenticity and tolerance:
//! - XChaCha20-Poly1305 AEAD provides tamper-evident encryption
//! - Decryption is deliberately tolerant: any failure returns the input
//!   unchanged so mixed encrypted/legacy-plaintext corpora stay readable

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
pub mod conversation;
pub mod identity;

pub use cipher::{DecryptOutcome, NONCE_SIZE, decrypt_message, encrypt_message, looks_encrypted};
pub use conversation::{ConversationKey, KEY_SIZE, derive_conversation_key};
pub use identity::{
    OPAQUE_ID_SIZE, OpaqueId, ParseOpaqueIdError, SecretError, ServerSecret, hash_identity,
};
