//! The service facade wiring config, storage, cache, and crypto together.

use veilmatch_core::{
    IdentityCache, IdentityResolver, MatchCreate, MatchRecord, MemoryCache, MemoryStore, PairKey,
    RealIdentity, ResolveScope, Store, StoredMessage, SwipeDirection, SwipeRecord, can_view_photo,
    can_view_profile, relationship_state,
    types::SALT_SIZE,
};
use veilmatch_crypto::{
    NONCE_SIZE, OpaqueId, decrypt_message, derive_conversation_key, encrypt_message,
    looks_encrypted,
};

use crate::{ServiceConfig, ServiceError};

/// Outcome of recording a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeOutcome {
    /// True if this swipe completed (or re-confirmed) mutual consent
    pub matched: bool,
}

/// Stateless request-handling facade over the matching core.
///
/// Owns no mutable state of its own: the store and cache are shared
/// collaborators, every decision is recomputed per call, and clones of the
/// service are interchangeable. The caller identities are assumed to come
/// from the session provider already authenticated.
#[derive(Clone)]
pub struct MatchService<S: Store, C: IdentityCache> {
    store: S,
    resolver: IdentityResolver<C>,
}

impl MatchService<MemoryStore, MemoryCache> {
    /// Convenience constructor over in-memory collaborators.
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::new(&config, MemoryStore::new(), MemoryCache::new())
    }
}

impl<S: Store, C: IdentityCache> MatchService<S, C> {
    /// Build a service over the given store and cache.
    pub fn new(config: &ServiceConfig, store: S, cache: C) -> Self {
        Self { store, resolver: IdentityResolver::new(cache, config.secret().clone()) }
    }

    /// The opaque pseudonym for a real identity. Always succeeds.
    pub fn opaque_for(&self, real: &RealIdentity) -> OpaqueId {
        self.resolver.opaque_for(real)
    }

    /// Resolve an opaque id on behalf of `viewer`.
    ///
    /// The scan scope is the viewer's matched counterparts, so the cost is
    /// O(matches) and a miss never reveals whether an out-of-scope
    /// identity exists. `None` means "not resolvable for this viewer".
    pub fn resolve(
        &self,
        opaque: &OpaqueId,
        viewer: &RealIdentity,
    ) -> Result<Option<RealIdentity>, ServiceError> {
        let matches = self.store.matches_of(viewer)?;
        let scope = ResolveScope::matched_counterparts(viewer, &matches);

        Ok(self.resolver.resolve(opaque, &scope))
    }

    /// Record a swipe and create the match when consent becomes mutual.
    ///
    /// A right-swipe checks for a prior right-swipe from the target back
    /// to the swiper; if found, a match record with a fresh random salt is
    /// created via the store's conditional create. Losing that race is
    /// converged to `matched: true` - the winner's record and salt stand.
    pub fn record_swipe(
        &self,
        from: &RealIdentity,
        to: &RealIdentity,
        direction: SwipeDirection,
    ) -> Result<SwipeOutcome, ServiceError> {
        if from == to {
            // Swiping yourself records nothing and matches nothing
            tracing::debug!(%from, "ignoring self-swipe");
            return Ok(SwipeOutcome { matched: false });
        }

        self.store.record_swipe(&SwipeRecord {
            from: from.clone(),
            to: to.clone(),
            direction,
            timestamp_secs: unix_now(),
        })?;

        if direction != SwipeDirection::Right {
            return Ok(SwipeOutcome { matched: false });
        }

        let reciprocated = self
            .store
            .swipe_between(to, from)?
            .is_some_and(|swipe| swipe.direction == SwipeDirection::Right);

        if !reciprocated {
            return Ok(SwipeOutcome { matched: false });
        }

        let key = PairKey::new(from, to);
        let record = MatchRecord::new(&key, unix_now(), generate_salt());

        match self.create_match_with_retry(&key, &record)? {
            MatchCreate::Created => {
                tracing::info!(pair = %key, "match created");
            },
            MatchCreate::AlreadyExists => {
                // The concurrent opposite-direction swipe won; same outcome
                tracing::debug!(pair = %key, "match already existed");
            },
        }

        Ok(SwipeOutcome { matched: true })
    }

    /// May `viewer` see `target`'s photos?
    pub fn can_view_photo(
        &self,
        viewer: &RealIdentity,
        target: &RealIdentity,
    ) -> Result<bool, ServiceError> {
        let state = relationship_state(&self.store, viewer, target)?;
        let granted = can_view_photo(&state);

        if !granted {
            tracing::debug!(%viewer, "photo access denied");
        }

        Ok(granted)
    }

    /// May `viewer` see `target`'s full structured profile?
    pub fn can_view_profile(
        &self,
        viewer: &RealIdentity,
        target: &RealIdentity,
    ) -> Result<bool, ServiceError> {
        let state = relationship_state(&self.store, viewer, target)?;
        let granted = can_view_profile(&state);

        if !granted {
            tracing::debug!(%viewer, "profile access denied");
        }

        Ok(granted)
    }

    /// Encrypt a message body for the conversation between `a` and `b`.
    ///
    /// Argument order of `a` and `b` is irrelevant; the derivation sorts
    /// the pair.
    pub fn encrypt_for_conversation(
        &self,
        plaintext: &str,
        a: &RealIdentity,
        b: &RealIdentity,
        salt: &[u8],
    ) -> String {
        let key = derive_conversation_key(a.as_str(), b.as_str(), salt);
        encrypt_message(plaintext, &key, generate_nonce())
    }

    /// Decrypt a message body for the conversation between `a` and `b`.
    ///
    /// Never fails: a body that does not authenticate under the derived
    /// key (corrupted salt, legacy plaintext, foreign ciphertext) is
    /// returned unchanged, logged as a diagnostic only.
    pub fn decrypt_for_conversation(
        &self,
        ciphertext: &str,
        a: &RealIdentity,
        b: &RealIdentity,
        salt: &[u8],
    ) -> String {
        let key = derive_conversation_key(a.as_str(), b.as_str(), salt);
        let outcome = decrypt_message(ciphertext, &key);

        if outcome.is_miss() {
            tracing::debug!("decryption miss, returning body unchanged");
        }

        outcome.into_text()
    }

    /// Encrypt and store a message from `from` to `to`.
    ///
    /// Requires mutual consent: the pair's match record supplies the salt.
    /// Denied generically when no match exists.
    pub fn send_message(
        &self,
        from: &RealIdentity,
        to: &RealIdentity,
        body: &str,
    ) -> Result<(), ServiceError> {
        let key = PairKey::new(from, to);
        let Some(record) = self.store.match_for(&key)? else {
            return Err(ServiceError::Unauthorized);
        };

        let ciphertext = self.encrypt_for_conversation(body, from, to, &record.salt);

        self.store.store_message(
            &key,
            &StoredMessage {
                from: from.clone(),
                body: ciphertext,
                timestamp_secs: unix_now(),
                is_encrypted: true,
            },
        )?;

        Ok(())
    }

    /// The conversation between `viewer` and `counterpart`, bodies
    /// decrypted where possible.
    ///
    /// Requires mutual consent. Flagged bodies are decrypted under the
    /// match salt; unflagged legacy bodies are attempted opportunistically
    /// when they look like ciphertext, otherwise passed through. A body
    /// that fails decryption is returned as stored - unreadable beats
    /// unavailable for a corrupted salt.
    pub fn conversation(
        &self,
        viewer: &RealIdentity,
        counterpart: &RealIdentity,
    ) -> Result<Vec<StoredMessage>, ServiceError> {
        let key = PairKey::new(viewer, counterpart);
        let Some(record) = self.store.match_for(&key)? else {
            return Err(ServiceError::Unauthorized);
        };

        let messages = self.store.messages_between(&key)?;

        Ok(messages
            .into_iter()
            .map(|mut message| {
                if message.is_encrypted || looks_encrypted(&message.body) {
                    message.body = self.decrypt_for_conversation(
                        &message.body,
                        viewer,
                        counterpart,
                        &record.salt,
                    );
                }
                message
            })
            .collect())
    }

    /// Conditional create with the retry-once policy for store faults.
    ///
    /// The retry reuses the same pair key and record, so a success on
    /// either attempt (or a concurrent winner) converges to one record.
    fn create_match_with_retry(
        &self,
        key: &PairKey,
        record: &MatchRecord,
    ) -> Result<MatchCreate, ServiceError> {
        match self.store.create_match_if_absent(key, record) {
            Ok(outcome) => Ok(outcome),
            Err(first) => {
                tracing::warn!(pair = %key, error = %first, "match create failed, retrying once");
                Ok(self.store.create_match_if_absent(key, record)?)
            },
        }
    }
}

/// Current wall-clock time as Unix seconds.
fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

/// Fresh random conversation salt.
///
/// # Panics
///
/// Panics if the OS RNG fails. This is intentional - a match created with
/// a predictable salt would fix a derivable conversation key, so
/// continuing without functioning randomness is worse than crashing.
#[allow(clippy::expect_used)]
fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    getrandom::fill(&mut salt)
        .expect("invariant: OS RNG failure is unrecoverable - salts must be unpredictable");
    salt
}

/// Fresh random AEAD nonce.
///
/// # Panics
///
/// Panics if the OS RNG fails, for the same reason as salt generation.
#[allow(clippy::expect_used)]
fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    getrandom::fill(&mut nonce)
        .expect("invariant: OS RNG failure is unrecoverable - nonces must not repeat");
    nonce
}
