//! Fuzz target for relationship state and the access gates
//!
//! Replays arbitrary swipe/match operation sequences against the store and
//! evaluates the gates after every step.
//!
//! # Strategy
//!
//! - Small identity pool so operations actually collide on pairs
//! - Arbitrary interleavings of left/right swipes and conditional creates
//! - State queried for every ordered pair, including self-views
//!
//! # Invariants
//!
//! - State resolution and gate evaluation never panic
//! - At most one match record per pair, whatever the sequence
//! - The profile gate never grants where the photo gate denies
//! - Self-views are always granted by both gates

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veilmatch_core::{
    can_view_photo, can_view_profile, relationship_state, MatchRecord, MemoryStore, PairKey,
    RealIdentity, Store, SwipeDirection, SwipeRecord,
};

const POOL: [&str; 4] = ["a@x", "b@x", "c@x", "d@x"];

#[derive(Debug, Arbitrary)]
enum Operation {
    Swipe { from: u8, to: u8, right: bool },
    TryMatch { a: u8, b: u8, salt: [u8; 32] },
}

fn pick(index: u8) -> RealIdentity {
    RealIdentity::from(POOL[index as usize % POOL.len()])
}

fuzz_target!(|operations: Vec<Operation>| {
    let store = MemoryStore::new();

    for operation in operations {
        match operation {
            Operation::Swipe { from, to, right } => {
                let direction = if right { SwipeDirection::Right } else { SwipeDirection::Left };
                store
                    .record_swipe(&SwipeRecord {
                        from: pick(from),
                        to: pick(to),
                        direction,
                        timestamp_secs: 0,
                    })
                    .unwrap();
            }
            Operation::TryMatch { a, b, salt } => {
                let key = PairKey::new(&pick(a), &pick(b));
                let record = MatchRecord::new(&key, 0, salt);
                store.create_match_if_absent(&key, &record).unwrap();
            }
        }

        for viewer in POOL {
            for target in POOL {
                let viewer = RealIdentity::from(viewer);
                let target = RealIdentity::from(target);
                let state = relationship_state(&store, &viewer, &target).unwrap();

                if viewer == target {
                    assert!(state.is_self);
                    assert!(can_view_photo(&state));
                    assert!(can_view_profile(&state));
                }

                if can_view_profile(&state) {
                    assert!(can_view_photo(&state));
                }
            }
        }
    }

    // Match count is bounded by the number of distinct pairs
    assert!(store.match_count() <= POOL.len() * (POOL.len() - 1) / 2 + POOL.len());
});
