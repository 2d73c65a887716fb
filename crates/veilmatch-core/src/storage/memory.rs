#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use super::{MatchCreate, Store, StoreError};
use crate::types::{MatchRecord, PairKey, RealIdentity, StoredMessage, SwipeRecord};

/// In-memory store implementation for testing and simulation
///
/// Uses `HashMap` for lookups and Vec for append-only swipe and message
/// logs. All state is wrapped in Arc<Mutex<>> to allow Clone and concurrent
/// access. Thread-safe through Mutex, but uses `lock().expect()` which will
/// panic if the mutex is poisoned - acceptable for test code. The match
/// table's `entry` API provides the atomic conditional create.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

struct MemoryStoreInner {
    /// Swipe logs keyed by (from, to), newest last
    swipes: HashMap<(RealIdentity, RealIdentity), Vec<SwipeRecord>>,

    /// Match records keyed by canonical pair key
    matches: HashMap<PairKey, MatchRecord>,

    /// Conversation logs keyed by canonical pair key, stored order
    messages: HashMap<PairKey, Vec<StoredMessage>>,
}

impl MemoryStore {
    /// Create a new empty `MemoryStore`
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryStoreInner {
                swipes: HashMap::new(),
                matches: HashMap::new(),
                messages: HashMap::new(),
            })),
        }
    }

    /// Number of match records stored.
    ///
    /// Useful for debugging and testing.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (a thread panicked while
    /// holding the lock). This is acceptable for test/simulation code.
    #[allow(clippy::expect_used)]
    pub fn match_count(&self) -> usize {
        self.inner.lock().expect("Mutex poisoned").matches.len()
    }

    /// Total number of swipe records across all pairs.
    ///
    /// Useful for debugging and testing.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (a thread panicked while
    /// holding the lock). This is acceptable for test/simulation code.
    #[allow(clippy::expect_used)]
    pub fn swipe_count(&self) -> usize {
        let inner = self.inner.lock().expect("Mutex poisoned");
        inner.swipes.values().map(std::vec::Vec::len).sum()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. This is acceptable for test
    /// code.
    #[allow(clippy::expect_used)]
    fn record_swipe(&self, swipe: &SwipeRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");

        inner
            .swipes
            .entry((swipe.from.clone(), swipe.to.clone()))
            .or_default()
            .push(swipe.clone());

        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. This is acceptable for test
    /// code.
    #[allow(clippy::expect_used)]
    fn swipe_between(
        &self,
        from: &RealIdentity,
        to: &RealIdentity,
    ) -> Result<Option<SwipeRecord>, StoreError> {
        let inner = self.inner.lock().expect("Mutex poisoned");

        Ok(inner
            .swipes
            .get(&(from.clone(), to.clone()))
            .and_then(|log| log.last())
            .cloned())
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. This is acceptable for test
    /// code.
    #[allow(clippy::expect_used)]
    fn create_match_if_absent(
        &self,
        key: &PairKey,
        record: &MatchRecord,
    ) -> Result<MatchCreate, StoreError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");

        match inner.matches.entry(key.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => Ok(MatchCreate::AlreadyExists),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(MatchCreate::Created)
            },
        }
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. This is acceptable for test
    /// code.
    #[allow(clippy::expect_used)]
    fn match_for(&self, key: &PairKey) -> Result<Option<MatchRecord>, StoreError> {
        let inner = self.inner.lock().expect("Mutex poisoned");

        Ok(inner.matches.get(key).cloned())
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. This is acceptable for test
    /// code.
    #[allow(clippy::expect_used)]
    fn matches_of(&self, identity: &RealIdentity) -> Result<Vec<MatchRecord>, StoreError> {
        let inner = self.inner.lock().expect("Mutex poisoned");

        Ok(inner
            .matches
            .values()
            .filter(|record| record.counterpart_of(identity).is_some())
            .cloned()
            .collect())
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. This is acceptable for test
    /// code.
    #[allow(clippy::expect_used)]
    fn store_message(&self, key: &PairKey, message: &StoredMessage) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");

        inner.messages.entry(key.clone()).or_default().push(message.clone());

        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. This is acceptable for test
    /// code.
    #[allow(clippy::expect_used)]
    fn messages_between(&self, key: &PairKey) -> Result<Vec<StoredMessage>, StoreError> {
        let inner = self.inner.lock().expect("Mutex poisoned");

        Ok(inner.messages.get(key).cloned().unwrap_or_default())
    }
}
