//! Identity pseudonymization using keyed hashing
//!
//! Real account identifiers are transformed into stable 128-bit opaque ids
//! with HMAC-SHA256 under the server secret. The transform is one-way for
//! anyone who does not hold the secret, and deterministic for the server,
//! so the mapping can always be rebuilt after a restart.

use std::{fmt, str::FromStr};

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Domain separation label for identity pseudonyms
const IDENTITY_LABEL: &[u8] = b"veilmatchIdentityV1";

/// Size of an opaque id in bytes (128 bits)
pub const OPAQUE_ID_SIZE: usize = 16;

/// A stable pseudonym safe for exposure to other parties.
///
/// Truncated keyed hash of a real identity under the server secret.
/// Deterministic for a fixed secret, so the same identity always maps to
/// the same opaque id across restarts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpaqueId([u8; OPAQUE_ID_SIZE]);

impl OpaqueId {
    /// Construct from raw bytes.
    pub fn from_bytes(bytes: [u8; OPAQUE_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw 16-byte pseudonym.
    pub fn as_bytes(&self) -> &[u8; OPAQUE_ID_SIZE] {
        &self.0
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueId({})", hex::encode(self.0))
    }
}

/// Error parsing an opaque id from its hex form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid opaque id: expected {expected} hex characters", expected = OPAQUE_ID_SIZE * 2)]
pub struct ParseOpaqueIdError;

impl FromStr for OpaqueId {
    type Err = ParseOpaqueIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s).map_err(|_| ParseOpaqueIdError)?;
        let bytes: [u8; OPAQUE_ID_SIZE] = raw.try_into().map_err(|_| ParseOpaqueIdError)?;
        Ok(Self(bytes))
    }
}

/// Errors constructing a server secret.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// The secret material was empty
    #[error("server secret must not be empty")]
    Empty,
}

/// Server-held secret keying the identity pseudonym transform.
///
/// The secret is the sole input (besides the identity itself) that fixes
/// the real-to-opaque mapping. Losing it breaks every issued pseudonym, so
/// it must be stable for the lifetime of the deployment. Key material is
/// zeroed on drop.
#[derive(Clone)]
pub struct ServerSecret(Zeroizing<Vec<u8>>);

impl ServerSecret {
    /// Construct from secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Empty`] if the material is empty. An empty
    /// secret would silently degrade every pseudonym to an unkeyed hash.
    pub fn new(material: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let material = material.into();
        if material.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self(Zeroizing::new(material)))
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ServerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        write!(f, "ServerSecret({} bytes)", self.0.len())
    }
}

/// Pseudonymize a real identity into its opaque id.
///
/// HMAC-SHA256 keyed by the server secret, truncated to 128 bits. Pure and
/// deterministic: the same identity and secret always yield the same id.
///
/// # Security
///
/// - One-way: recovering the identity from the id requires the secret and
///   a candidate to test against
/// - Collision-resistant at the 128-bit truncation for realistic identity
///   space sizes
pub fn hash_identity(real: &str, secret: &ServerSecret) -> OpaqueId {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        unreachable!("HMAC-SHA256 accepts keys of any length");
    };

    mac.update(IDENTITY_LABEL);
    mac.update(real.as_bytes());

    let digest = mac.finalize().into_bytes();
    let mut truncated = [0u8; OPAQUE_ID_SIZE];
    truncated.copy_from_slice(&digest[..OPAQUE_ID_SIZE]);

    OpaqueId(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(material: &[u8]) -> ServerSecret {
        ServerSecret::new(material.to_vec()).unwrap()
    }

    #[test]
    fn hash_is_deterministic() {
        let s = secret(b"test_server_secret");

        let id1 = hash_identity("alice@example.com", &s);
        let id2 = hash_identity("alice@example.com", &s);

        assert_eq!(id1, id2, "same identity and secret must produce same id");
    }

    #[test]
    fn different_identities_produce_different_ids() {
        let s = secret(b"test_server_secret");

        let alice = hash_identity("alice@example.com", &s);
        let bob = hash_identity("bob@example.com", &s);

        assert_ne!(alice, bob);
    }

    #[test]
    fn different_secrets_produce_different_ids() {
        let id_a = hash_identity("alice@example.com", &secret(b"secret_a"));
        let id_b = hash_identity("alice@example.com", &secret(b"secret_b"));

        assert_ne!(id_a, id_b, "pseudonyms must be keyed by the secret");
    }

    #[test]
    fn empty_secret_rejected() {
        assert!(matches!(ServerSecret::new(Vec::new()), Err(SecretError::Empty)));
    }

    #[test]
    fn hex_round_trip() {
        let id = hash_identity("alice@example.com", &secret(b"test_server_secret"));

        let text = id.to_string();
        assert_eq!(text.len(), OPAQUE_ID_SIZE * 2);

        let parsed: OpaqueId = text.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("not-hex".parse::<OpaqueId>().is_err());
        assert!("abcd".parse::<OpaqueId>().is_err()); // too short
        let too_long = "ab".repeat(OPAQUE_ID_SIZE + 1);
        assert!(too_long.parse::<OpaqueId>().is_err());
    }

    #[test]
    fn debug_never_prints_secret_material() {
        let s = secret(b"super_secret_material");
        let rendered = format!("{s:?}");
        assert!(!rendered.contains("super_secret_material"));
    }

    #[test]
    fn works_with_unicode_identities() {
        let s = secret(b"test_server_secret");
        let id = hash_identity("météo@exämple.com", &s);
        assert_eq!(id.as_bytes().len(), OPAQUE_ID_SIZE);
    }
}
