//! Fuzz target for the tolerant message cipher
//!
//! Tests decryption and the ciphertext heuristic under adversarial inputs.
//!
//! # Strategy
//!
//! - Arbitrary byte soup decoded lossily into candidate ciphertext
//! - Arbitrary identities and salts for key derivation
//! - Genuine ciphertext with injected corruption at arbitrary offsets
//!
//! # Invariants
//!
//! - Decryption never panics, whatever the input
//! - A miss returns the input byte-for-byte unchanged
//! - Round-trip through encrypt always authenticates
//! - Corrupting genuine ciphertext turns success into a miss, never a panic

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veilmatch_crypto::{
    decrypt_message, derive_conversation_key, encrypt_message, looks_encrypted, DecryptOutcome,
    NONCE_SIZE,
};

#[derive(Debug, Arbitrary)]
struct DecryptScenario {
    /// Raw candidate input (interpreted lossily as UTF-8)
    input: Vec<u8>,
    /// First identity
    a: String,
    /// Second identity
    b: String,
    /// Key derivation salt
    salt: Vec<u8>,
    /// Nonce for the round-trip leg
    nonce: [u8; NONCE_SIZE],
    /// Corruption offset for the tamper leg
    corrupt_at: usize,
}

fuzz_target!(|scenario: DecryptScenario| {
    let key = derive_conversation_key(&scenario.a, &scenario.b, &scenario.salt);

    // Leg 1: arbitrary input must never panic, and a miss must echo it
    let input = String::from_utf8_lossy(&scenario.input).into_owned();
    let _ = looks_encrypted(&input);
    match decrypt_message(&input, &key) {
        DecryptOutcome::Plaintext(_) => {},
        DecryptOutcome::Miss(echoed) => assert_eq!(echoed, input),
    }

    // Leg 2: a genuine round-trip always authenticates
    let plaintext = String::from_utf8_lossy(&scenario.input).into_owned();
    let encrypted = encrypt_message(&plaintext, &key, scenario.nonce);
    match decrypt_message(&encrypted, &key) {
        DecryptOutcome::Plaintext(recovered) => assert_eq!(recovered, plaintext),
        DecryptOutcome::Miss(_) => panic!("fresh ciphertext must authenticate"),
    }

    // Leg 3: corrupting genuine ciphertext degrades to a miss, no panic
    let mut bytes = encrypted.into_bytes();
    if !bytes.is_empty() {
        let at = scenario.corrupt_at % bytes.len();
        bytes[at] = bytes[at].wrapping_add(1);
        let corrupted = String::from_utf8_lossy(&bytes).into_owned();
        let _ = decrypt_message(&corrupted, &key);
    }
});
