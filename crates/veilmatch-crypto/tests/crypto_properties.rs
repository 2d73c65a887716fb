//! Property-based tests for Veilmatch crypto primitives
//!
//! These tests verify the fundamental invariants of the crypto layer:
//!
//! 1. **Round-trip**: decrypt(encrypt(m, k), k) == m for all messages
//! 2. **Pseudonym injectivity**: distinct identities get distinct opaque ids
//! 3. **Key symmetry**: derive(a, b, salt) == derive(b, a, salt)
//! 4. **Salt isolation**: the wrong salt never recovers the plaintext
//! 5. **Tolerance**: decryption never panics, whatever the input

use proptest::prelude::*;
use veilmatch_crypto::{
    DecryptOutcome, NONCE_SIZE, ServerSecret, decrypt_message, derive_conversation_key,
    encrypt_message, hash_identity, looks_encrypted,
};

fn identity_strategy() -> impl Strategy<Value = String> {
    // Printable account-identifier-ish strings, including unicode
    proptest::string::string_regex("[a-z0-9._+-]{1,24}@[a-z0-9.-]{1,16}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_encrypt_decrypt_roundtrip(
        plaintext in ".{0,400}",
        a in identity_strategy(),
        b in identity_strategy(),
        salt in prop::array::uniform32(any::<u8>()),
        nonce in prop::array::uniform24(any::<u8>()),
    ) {
        let key = derive_conversation_key(&a, &b, &salt);

        let encrypted = encrypt_message(&plaintext, &key, nonce);
        let outcome = decrypt_message(&encrypted, &key);

        prop_assert_eq!(outcome, DecryptOutcome::Plaintext(plaintext));
    }

    #[test]
    fn prop_key_derivation_is_symmetric(
        a in identity_strategy(),
        b in identity_strategy(),
        salt in prop::array::uniform32(any::<u8>()),
    ) {
        let ab = derive_conversation_key(&a, &b, &salt);
        let ba = derive_conversation_key(&b, &a, &salt);

        prop_assert_eq!(ab.key(), ba.key());
    }

    #[test]
    fn prop_wrong_salt_never_recovers_plaintext(
        plaintext in ".{1,200}",
        a in identity_strategy(),
        b in identity_strategy(),
        salt1 in prop::array::uniform32(any::<u8>()),
        salt2 in prop::array::uniform32(any::<u8>()),
        nonce in prop::array::uniform24(any::<u8>()),
    ) {
        prop_assume!(salt1 != salt2);

        let key1 = derive_conversation_key(&a, &b, &salt1);
        let key2 = derive_conversation_key(&a, &b, &salt2);

        let encrypted = encrypt_message(&plaintext, &key1, nonce);
        let outcome = decrypt_message(&encrypted, &key2);

        // The miss carries the raw ciphertext, never the plaintext
        prop_assert!(outcome.is_miss());
        prop_assert_eq!(outcome.into_text(), encrypted);
    }

    #[test]
    fn prop_distinct_identities_get_distinct_pseudonyms(
        a in identity_strategy(),
        b in identity_strategy(),
        secret in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        prop_assume!(a != b);

        let secret = ServerSecret::new(secret).unwrap();

        prop_assert_ne!(hash_identity(&a, &secret), hash_identity(&b, &secret));
    }

    #[test]
    fn prop_pseudonym_is_stable(
        identity in identity_strategy(),
        secret in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let secret = ServerSecret::new(secret).unwrap();

        prop_assert_eq!(hash_identity(&identity, &secret), hash_identity(&identity, &secret));
    }

    #[test]
    fn prop_decrypt_never_panics(
        input in ".{0,500}",
        salt in prop::array::uniform32(any::<u8>()),
    ) {
        let key = derive_conversation_key("a@x", "b@x", &salt);
        let _ = decrypt_message(&input, &key);
    }

    #[test]
    fn prop_fresh_ciphertext_passes_heuristic(
        plaintext in ".{0,200}",
        salt in prop::array::uniform32(any::<u8>()),
        nonce in prop::array::uniform24(any::<u8>()),
    ) {
        let key = derive_conversation_key("a@x", "b@x", &salt);
        let encrypted = encrypt_message(&plaintext, &key, nonce);

        prop_assert!(looks_encrypted(&encrypted));
    }
}

#[test]
fn pseudonym_uniqueness_large_sample() {
    // Spec-level sanity check on a large sample of generated identities
    let secret = ServerSecret::new(b"sample_secret".to_vec()).unwrap();

    let mut seen = std::collections::HashSet::new();
    for i in 0..10_000u32 {
        let identity = format!("user{i}@example.com");
        assert!(
            seen.insert(hash_identity(&identity, &secret)),
            "collision at {identity}"
        );
    }
}

#[test]
fn nonce_size_matches_xchacha() {
    assert_eq!(NONCE_SIZE, 24);
}
