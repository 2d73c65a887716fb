//! Chaotic store wrapper for fault injection testing
//!
//! Store wrapper that fails operations to test error handling and
//! recovery - in particular the retry-once policy around match creation.
//! Supports random failures at a configured rate and deterministic
//! fail-the-next-N injection.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{Arc, Mutex};

use super::{MatchCreate, Store, StoreError};
use crate::types::{MatchRecord, PairKey, RealIdentity, StoredMessage, SwipeRecord};

/// Chaotic store wrapper that injects failures
///
/// Delegates to an underlying store implementation but fails operations
/// either randomly (configured failure rate) or deterministically (next-N
/// counter). Uses Arc<Mutex<>> for the RNG state, making it Clone and
/// thread-safe.
#[derive(Clone)]
pub struct ChaoticStore<S: Store> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// RNG state for deterministic chaos
    rng: Arc<Mutex<ChaoticRng>>,
    /// Deterministic injection plan
    forced_failures: Arc<Mutex<ForcedFailures>>,
    /// Operation counter
    operation_count: Arc<Mutex<usize>>,
}

/// Deterministic failure plan for [`ChaoticStore`].
enum ForcedFailures {
    /// Fail the next N operations of any kind
    Any(u32),
    /// Fail the next N calls of the named operation only
    Op(String, u32),
}

impl ForcedFailures {
    /// Consume one failure if this operation is covered by the plan.
    fn take(&mut self, operation: &str) -> bool {
        match self {
            Self::Any(n) | Self::Op(_, n) if *n == 0 => false,
            Self::Any(n) => {
                *n -= 1;
                true
            },
            Self::Op(name, n) => {
                if name == operation {
                    *n -= 1;
                    true
                } else {
                    false
                }
            },
        }
    }
}

/// Simple deterministic RNG for chaos injection
///
/// Linear congruential generator for fast, deterministic randomness, so
/// chaos tests are reproducible with the same seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate next random value [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // LCG constants from Numerical Recipes
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }

    fn should_fail(&mut self, failure_rate: f64) -> bool {
        self.next() < failure_rate
    }
}

impl<S: Store> ChaoticStore<S> {
    /// Create a new chaotic store wrapper
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Create with explicit seed for reproducible chaos
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            forced_failures: Arc::new(Mutex::new(ForcedFailures::Any(0))),
            operation_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Fail exactly the next `n` operations, then behave normally.
    ///
    /// Deterministic injection for exercising retry paths.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    pub fn fail_next(&self, n: u32) {
        *self.forced_failures.lock().expect("Mutex poisoned") = ForcedFailures::Any(n);
    }

    /// Fail exactly the next `n` calls of the named operation, letting
    /// every other operation through.
    ///
    /// Operation names are the `Store` method names, e.g.
    /// `"create_match_if_absent"`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    pub fn fail_next_op(&self, operation: &str, n: u32) {
        *self.forced_failures.lock().expect("Mutex poisoned") =
            ForcedFailures::Op(operation.to_string(), n);
    }

    /// Number of operations attempted through this wrapper.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    pub fn operation_count(&self) -> usize {
        *self.operation_count.lock().expect("Mutex poisoned")
    }

    /// Decide whether this operation fails.
    #[allow(clippy::expect_used)]
    fn inject(&self, operation: &str) -> Result<(), StoreError> {
        *self.operation_count.lock().expect("Mutex poisoned") += 1;

        {
            let mut forced = self.forced_failures.lock().expect("Mutex poisoned");
            if forced.take(operation) {
                return Err(StoreError::Io(format!("injected failure during {operation}")));
            }
        }

        let mut rng = self.rng.lock().expect("Mutex poisoned");
        if rng.should_fail(self.failure_rate) {
            return Err(StoreError::Io(format!("injected failure during {operation}")));
        }

        Ok(())
    }
}

impl<S: Store> Store for ChaoticStore<S> {
    fn record_swipe(&self, swipe: &SwipeRecord) -> Result<(), StoreError> {
        self.inject("record_swipe")?;
        self.inner.record_swipe(swipe)
    }

    fn swipe_between(
        &self,
        from: &RealIdentity,
        to: &RealIdentity,
    ) -> Result<Option<SwipeRecord>, StoreError> {
        self.inject("swipe_between")?;
        self.inner.swipe_between(from, to)
    }

    fn create_match_if_absent(
        &self,
        key: &PairKey,
        record: &MatchRecord,
    ) -> Result<MatchCreate, StoreError> {
        self.inject("create_match_if_absent")?;
        self.inner.create_match_if_absent(key, record)
    }

    fn match_for(&self, key: &PairKey) -> Result<Option<MatchRecord>, StoreError> {
        self.inject("match_for")?;
        self.inner.match_for(key)
    }

    fn matches_of(&self, identity: &RealIdentity) -> Result<Vec<MatchRecord>, StoreError> {
        self.inject("matches_of")?;
        self.inner.matches_of(identity)
    }

    fn store_message(&self, key: &PairKey, message: &StoredMessage) -> Result<(), StoreError> {
        self.inject("store_message")?;
        self.inner.store_message(key, message)
    }

    fn messages_between(&self, key: &PairKey) -> Result<Vec<StoredMessage>, StoreError> {
        self.inject("messages_between")?;
        self.inner.messages_between(key)
    }
}
