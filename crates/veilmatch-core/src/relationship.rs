//! Relationship state resolution
//!
//! Computes the fact-set describing how a viewer relates to a target from
//! the current swipe and match records. The facts are deliberately an
//! explicit set of booleans, not an enum: a viewer can simultaneously have
//! swiped right and be liked back without a match record existing yet, and
//! downstream access gates OR individual facts together.

use crate::{
    storage::{Store, StoreError},
    types::{PairKey, RealIdentity, SwipeDirection},
};

/// Derived facts about a viewer/target relationship.
///
/// Computed per request, never stored. Facts are not mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationshipState {
    /// Viewer and target are the same identity
    pub is_self: bool,
    /// A match record exists for the canonical pair
    pub is_matched: bool,
    /// The viewer's recorded swipe on the target is a right-swipe (only
    /// reported while no match record exists; once matched, `is_matched`
    /// carries the fact)
    pub viewer_swiped_right: bool,
    /// The target right-swiped the viewer, independent of the viewer's
    /// own swipe state
    pub target_swiped_right: bool,
    /// The viewer has recorded any swipe on the target
    pub viewer_has_swiped: bool,
}

impl RelationshipState {
    /// The viewer looking at their own profile.
    pub fn own_profile() -> Self {
        Self { is_self: true, ..Self::default() }
    }
}

/// Compute the relationship facts between `viewer` and `target`.
///
/// Pure function of the store's current swipe/match record set: the same
/// records always yield the same facts. An absent viewer swipe is treated
/// permissively downstream (pre-decision browsing), so it is reported as
/// `viewer_has_swiped == false` rather than an error.
pub fn relationship_state<S: Store>(
    store: &S,
    viewer: &RealIdentity,
    target: &RealIdentity,
) -> Result<RelationshipState, StoreError> {
    if viewer == target {
        return Ok(RelationshipState::own_profile());
    }

    let is_matched = store.match_for(&PairKey::new(viewer, target))?.is_some();

    let viewer_swipe = store.swipe_between(viewer, target)?;
    let viewer_has_swiped = viewer_swipe.is_some();
    let viewer_swiped_right = !is_matched
        && viewer_swipe.is_some_and(|swipe| swipe.direction == SwipeDirection::Right);

    let target_swiped_right = store
        .swipe_between(target, viewer)?
        .is_some_and(|swipe| swipe.direction == SwipeDirection::Right);

    Ok(RelationshipState {
        is_self: false,
        is_matched,
        viewer_swiped_right,
        target_swiped_right,
        viewer_has_swiped,
    })
}
