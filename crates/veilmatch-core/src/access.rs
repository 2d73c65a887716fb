//! Access gates for photos and profile details
//!
//! Two deliberately distinct policies consume the relationship fact-set:
//!
//! - The photo gate is permissive: browsing before any decision exists is
//!   allowed (the swipe flow fetches photos before a swipe is recorded),
//!   a one-sided like keeps visibility, and being liked lets the viewer
//!   preview the suitor (the "who likes me" queue). The only denial is an
//!   explicit rejection that was not liked back.
//! - The profile-detail gate is strict: mutual consent only.
//!
//! Keep these separate; merging them widens the strict gate.

use crate::relationship::RelationshipState;

/// May the viewer see the target's photos?
///
/// Grants on any of: own photos, matched, no decision recorded yet,
/// viewer liked the target, or target liked the viewer. The sole denial
/// is a recorded rejection without a like back.
pub fn can_view_photo(state: &RelationshipState) -> bool {
    state.is_self
        || state.is_matched
        || !state.viewer_has_swiped
        || state.viewer_swiped_right
        || state.target_swiped_right
}

/// May the viewer see the target's full structured profile?
///
/// Strictly own profile or mutual consent. Intentionally narrower than
/// [`can_view_photo`].
pub fn can_view_profile(state: &RelationshipState) -> bool {
    state.is_self || state.is_matched
}
