use super::models::{Match, ScoreResult, Swipe, SwipeAction};
use anyhow::Result;
use std::collections::HashSet;

/// Persistence for swipes and matches.
///
/// The store is the serialization point for concurrent swipes: both
/// `create_swipe` and `create_match` are atomic insert-or-reject, so two
/// racing mutual-like completions cannot produce duplicates.
pub trait MatchStore: Send + Sync {
    /// Records a swipe. Returns Ok(None) when a swipe for this ordered
    /// pair already exists (regardless of action).
    fn create_swipe(
        &self,
        user_id: usize,
        target_user_id: usize,
        action: SwipeAction,
    ) -> Result<Option<Swipe>>;

    /// Returns Ok(None) if no swipe exists for the ordered pair.
    fn get_swipe(&self, user_id: usize, target_user_id: usize) -> Result<Option<Swipe>>;

    /// Whether `target` has already liked `user`.
    fn has_reciprocal_like(&self, user_id: usize, target_user_id: usize) -> Result<bool>;

    /// All target ids the user has swiped on, either direction of action.
    fn swiped_target_ids(&self, user_id: usize) -> Result<HashSet<usize>>;

    /// Creates the match for an unordered pair, storing the score snapshot.
    /// Returns the match plus whether this call created it; when a match
    /// for the pair already exists it is returned untouched.
    fn create_match(
        &self,
        user_a: usize,
        user_b: usize,
        breakdown: &ScoreResult,
    ) -> Result<(Match, bool)>;

    /// Returns Ok(None) if the match does not exist.
    fn get_match(&self, match_id: usize) -> Result<Option<Match>>;

    /// The match between two users, if any, regardless of stored order.
    fn get_match_for_pair(&self, user_a: usize, user_b: usize) -> Result<Option<Match>>;

    /// All matches involving the user, newest first.
    fn matches_for_user(&self, user_id: usize) -> Result<Vec<Match>>;
}
