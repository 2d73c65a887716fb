//! Identity resolution between real identifiers and opaque pseudonyms
//!
//! Forward resolution (real to opaque) is a deterministic hash and always
//! succeeds. Reverse resolution has no trapdoor: the resolver re-hashes
//! candidate identities from an explicit, bounded scope until one matches.
//! The scope is the authorization boundary - in sensitive contexts it is
//! the viewer's matched counterparts, so a miss never reveals whether an
//! identity outside the viewer's reach exists at all.
//!
//! The cache is pure memoization of a deterministic function: entries are
//! never source of truth, races between writers are harmless, and losing
//! the cache only costs recomputation.

use veilmatch_crypto::{OpaqueId, ServerSecret, hash_identity};

use crate::types::{MatchRecord, RealIdentity};

/// Bidirectional memoization of the identity pseudonym mapping.
///
/// Injectable so deployments can swap the process-local map for a shared
/// cache. Implementations must be cheap to clone (share state via Arc).
pub trait IdentityCache: Clone + Send + Sync + 'static {
    /// Cached real identity for an opaque id, if known.
    fn get_real(&self, opaque: &OpaqueId) -> Option<RealIdentity>;

    /// Cached opaque id for a real identity, if known.
    fn get_opaque(&self, real: &RealIdentity) -> Option<OpaqueId>;

    /// Memoize a mapping in both directions.
    ///
    /// Idempotent: the hash is deterministic, so concurrent writers racing
    /// on the same identity store the same value. Last-write-wins is safe.
    fn put(&self, real: RealIdentity, opaque: OpaqueId);

    /// Drop all cached mappings.
    fn clear(&self);
}

/// Process-local in-memory cache.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: std::sync::Arc<std::sync::Mutex<MemoryCacheInner>>,
}

#[derive(Default)]
struct MemoryCacheInner {
    forward: std::collections::HashMap<RealIdentity, OpaqueId>,
    reverse: std::collections::HashMap<OpaqueId, RealIdentity>,
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached identities.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("Mutex poisoned").forward.len()
    }

    /// True if nothing is cached.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test code.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityCache for MemoryCache {
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    fn get_real(&self, opaque: &OpaqueId) -> Option<RealIdentity> {
        self.inner.lock().expect("Mutex poisoned").reverse.get(opaque).cloned()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    fn get_opaque(&self, real: &RealIdentity) -> Option<OpaqueId> {
        self.inner.lock().expect("Mutex poisoned").forward.get(real).copied()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    fn put(&self, real: RealIdentity, opaque: OpaqueId) {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        inner.forward.insert(real.clone(), opaque);
        inner.reverse.insert(opaque, real);
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    fn clear(&self) {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        inner.forward.clear();
        inner.reverse.clear();
    }
}

/// Bounded candidate set for reverse resolution.
///
/// Unscoped scans over the whole identity space are disallowed in
/// authorization-sensitive contexts; callers build the scope from the
/// viewer's matched counterparts so the scan is O(matches).
#[derive(Debug, Clone, Default)]
pub struct ResolveScope {
    candidates: Vec<RealIdentity>,
}

impl ResolveScope {
    /// Scope over an explicit candidate list.
    pub fn from_candidates(candidates: Vec<RealIdentity>) -> Self {
        Self { candidates }
    }

    /// Scope over the counterparts of `viewer` in its match records.
    pub fn matched_counterparts(viewer: &RealIdentity, matches: &[MatchRecord]) -> Self {
        Self {
            candidates: matches
                .iter()
                .filter_map(|record| record.counterpart_of(viewer).cloned())
                .collect(),
        }
    }

    /// The candidates in this scope.
    pub fn candidates(&self) -> &[RealIdentity] {
        &self.candidates
    }
}

/// Resolves identities across the real/opaque boundary.
///
/// Owns the server secret and the injected cache; all resolution is a
/// deterministic function of those plus the candidate scope.
#[derive(Clone)]
pub struct IdentityResolver<C: IdentityCache> {
    cache: C,
    secret: ServerSecret,
}

impl<C: IdentityCache> IdentityResolver<C> {
    /// Create a resolver over the given cache and secret.
    pub fn new(cache: C, secret: ServerSecret) -> Self {
        Self { cache, secret }
    }

    /// The opaque pseudonym for a real identity.
    ///
    /// Always succeeds: computes the hash on a cache miss and memoizes it.
    pub fn opaque_for(&self, real: &RealIdentity) -> OpaqueId {
        if let Some(opaque) = self.cache.get_opaque(real) {
            return opaque;
        }

        let opaque = hash_identity(real.as_str(), &self.secret);
        self.cache.put(real.clone(), opaque);
        opaque
    }

    /// Resolve an opaque id back to a real identity within `scope`.
    ///
    /// Checks the cache first; on a miss, hashes each candidate in the
    /// scope until one matches, memoizing the hit. Returns `None` when the
    /// id resolves to nothing in scope - deliberately indistinguishable
    /// from the id not existing at all.
    pub fn resolve(&self, opaque: &OpaqueId, scope: &ResolveScope) -> Option<RealIdentity> {
        if let Some(real) = self.cache.get_real(opaque) {
            return Some(real);
        }

        for candidate in scope.candidates() {
            let hashed = hash_identity(candidate.as_str(), &self.secret);
            self.cache.put(candidate.clone(), hashed);
            if hashed == *opaque {
                return Some(candidate.clone());
            }
        }

        None
    }

    /// The cache this resolver memoizes into.
    pub fn cache(&self) -> &C {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> IdentityResolver<MemoryCache> {
        let secret = ServerSecret::new(b"test_server_secret".to_vec()).unwrap();
        IdentityResolver::new(MemoryCache::new(), secret)
    }

    fn identity(name: &str) -> RealIdentity {
        RealIdentity::from(name)
    }

    #[test]
    fn opaque_for_is_stable() {
        let r = resolver();
        let alice = identity("alice@example.com");

        assert_eq!(r.opaque_for(&alice), r.opaque_for(&alice));
    }

    #[test]
    fn opaque_for_populates_cache() {
        let r = resolver();
        assert!(r.cache().is_empty());

        r.opaque_for(&identity("alice@example.com"));

        assert_eq!(r.cache().len(), 1);
    }

    #[test]
    fn resolve_round_trip_within_scope() {
        let r = resolver();
        let alice = identity("alice@example.com");
        let opaque = r.opaque_for(&alice);

        // Fresh resolver sharing nothing: forces the scoped scan path
        let cold = resolver();
        let scope = ResolveScope::from_candidates(vec![identity("bob@x"), alice.clone()]);

        assert_eq!(cold.resolve(&opaque, &scope), Some(alice));
    }

    #[test]
    fn resolve_out_of_scope_is_none() {
        let r = resolver();
        let opaque = r.opaque_for(&identity("alice@example.com"));

        let scope = ResolveScope::from_candidates(vec![identity("bob@x"), identity("carol@x")]);

        // Alice exists, but not in this viewer's scope; the answer must
        // not distinguish that from nonexistence
        let cold = resolver();
        assert_eq!(cold.resolve(&opaque, &scope), None);
    }

    #[test]
    fn resolve_hits_cache_without_scope() {
        let r = resolver();
        let alice = identity("alice@example.com");
        let opaque = r.opaque_for(&alice);

        // Cached from opaque_for: resolves even with an empty scope
        assert_eq!(r.resolve(&opaque, &ResolveScope::default()), Some(alice));
    }

    #[test]
    fn scan_memoizes_candidates() {
        let r = resolver();
        let warm = resolver();
        let opaque = warm.opaque_for(&identity("carol@x"));

        let scope = ResolveScope::from_candidates(vec![
            identity("alice@x"),
            identity("bob@x"),
            identity("carol@x"),
        ]);
        r.resolve(&opaque, &scope);

        // Every scanned candidate is now cached, not just the hit
        assert_eq!(r.cache().len(), 3);
    }

    #[test]
    fn matched_counterparts_scope() {
        use crate::types::{MatchRecord, PairKey, SALT_SIZE};

        let alice = identity("alice@x");
        let bob = identity("bob@x");
        let carol = identity("carol@x");

        let ab = PairKey::new(&alice, &bob);
        let ac = PairKey::new(&alice, &carol);
        let matches = vec![
            MatchRecord::new(&ab, 0, [0u8; SALT_SIZE]),
            MatchRecord::new(&ac, 0, [0u8; SALT_SIZE]),
        ];

        let scope = ResolveScope::matched_counterparts(&alice, &matches);

        let mut candidates = scope.candidates().to_vec();
        candidates.sort();
        assert_eq!(candidates, vec![bob, carol]);
    }

    #[test]
    fn clear_forgets_mappings() {
        let r = resolver();
        let opaque = r.opaque_for(&identity("alice@example.com"));

        r.cache().clear();

        assert_eq!(r.resolve(&opaque, &ResolveScope::default()), None);
        // But the mapping is reconstructible: same hash, same id
        assert_eq!(r.opaque_for(&identity("alice@example.com")), opaque);
    }
}
