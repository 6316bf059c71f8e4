//! Swipe/match state machine and candidate selection
//!
//! Each operation is synchronous and request-scoped. Uniqueness of swipes
//! and one-shot match creation are enforced by the store's constraints;
//! the engine sequences the checks and side effects on top.

use super::compatibility::compute_compatibility;
use super::models::{
    CandidateFilters, Match, MatchingConfig, ScoreResult, ScoredCandidate, SwipeAction,
    SwipeOutcome,
};
use super::store::MatchStore;
use crate::error::{CoreError, CoreResult};
use crate::playlist::PlaylistManager;
use crate::profile::{MusicProfile, ProfileStore};
use crate::user::{User, UserStore};
use std::sync::Arc;
use tracing::info;

/// How many of a candidate's top artists the feed shows.
const FEED_TOP_ARTISTS: usize = 5;

pub struct MatchEngine {
    config: MatchingConfig,
    users: Arc<dyn UserStore>,
    profiles: Arc<dyn ProfileStore>,
    store: Arc<dyn MatchStore>,
    playlists: Arc<PlaylistManager>,
}

impl MatchEngine {
    pub fn new(
        config: MatchingConfig,
        users: Arc<dyn UserStore>,
        profiles: Arc<dyn ProfileStore>,
        store: Arc<dyn MatchStore>,
        playlists: Arc<PlaylistManager>,
    ) -> Self {
        MatchEngine {
            config,
            users,
            profiles,
            store,
            playlists,
        }
    }

    /// Scores two profiles with this engine's weights.
    pub fn score(&self, a: &MusicProfile, b: &MusicProfile) -> ScoreResult {
        compute_compatibility(&self.config, a, b)
    }

    fn profile_or_empty(&self, user_id: usize) -> CoreResult<MusicProfile> {
        Ok(self
            .profiles
            .get_profile(user_id)?
            .unwrap_or_else(|| MusicProfile::empty(user_id)))
    }

    /// Records a directional swipe. On a mutual like this creates the
    /// match (exactly once for the pair) with a score snapshot and seeds
    /// the shared playlist.
    pub fn record_swipe(
        &self,
        actor: usize,
        target: usize,
        action: SwipeAction,
    ) -> CoreResult<SwipeOutcome> {
        if actor == target {
            return Err(CoreError::Validation(
                "You cannot swipe on yourself".to_string(),
            ));
        }
        if self.users.get_user(target)?.is_none() {
            return Err(CoreError::NotFound("User"));
        }

        let swipe = self
            .store
            .create_swipe(actor, target, action)?
            .ok_or_else(|| {
                CoreError::Conflict("You have already swiped on this user".to_string())
            })?;

        let mut matched = None;
        if action == SwipeAction::Like && self.store.has_reciprocal_like(actor, target)? {
            matched = Some(self.complete_match(actor, target)?);
        }

        Ok(SwipeOutcome { swipe, matched })
    }

    fn complete_match(&self, actor: usize, target: usize) -> CoreResult<Match> {
        // Normal flow never retriggers this (swipes are unique), but a
        // pre-existing match is reused rather than duplicated.
        if let Some(existing) = self.store.get_match_for_pair(actor, target)? {
            return Ok(existing);
        }

        let profile_a = self.profile_or_empty(actor)?;
        let profile_b = self.profile_or_empty(target)?;
        let breakdown = compute_compatibility(&self.config, &profile_a, &profile_b);

        let (record, created) = self.store.create_match(actor, target, &breakdown)?;
        if created {
            info!(
                "Match {} formed between users {} and {} (score {})",
                record.id, actor, target, record.compatibility_score
            );
            self.playlists.seed_match_playlist(
                record.id,
                record.compatibility_score,
                actor,
                target,
            )?;
        }
        Ok(record)
    }

    /// All users eligible for scoring against `user`: everyone else with a
    /// profile whom the user has not yet swiped on, narrowed by the
    /// conjunctive attribute filters. No ordering guarantee.
    pub fn select_candidates(
        &self,
        user: usize,
        filters: &CandidateFilters,
    ) -> CoreResult<Vec<User>> {
        let swiped = self.store.swiped_target_ids(user)?;
        let mut candidates = Vec::new();
        for candidate_id in self.profiles.user_ids_with_profile()? {
            if candidate_id == user || swiped.contains(&candidate_id) {
                continue;
            }
            // The profile row can outlive the account; skip, not error.
            let Some(candidate) = self.users.get_user(candidate_id)? else {
                continue;
            };
            if let Some(course) = &filters.course {
                if candidate.course.as_deref() != Some(course.as_str()) {
                    continue;
                }
            }
            if let Some(year) = filters.year {
                if candidate.year != Some(year) {
                    continue;
                }
            }
            if let Some(faculty) = &filters.faculty {
                if candidate.faculty.as_deref() != Some(faculty.as_str()) {
                    continue;
                }
            }
            candidates.push(candidate);
        }
        Ok(candidates)
    }

    /// The swipe-ready feed: candidates scored against the caller, ranked
    /// by score descending with ascending user id as the tie-break.
    pub fn candidate_feed(
        &self,
        user: usize,
        filters: &CandidateFilters,
    ) -> CoreResult<Vec<ScoredCandidate>> {
        let my_profile = self.profiles.get_profile(user)?.ok_or_else(|| {
            CoreError::Validation("Please sync your music profile first".to_string())
        })?;

        let mut feed = Vec::new();
        for candidate in self.select_candidates(user, filters)? {
            // Selector already filtered on profile presence; a racing
            // profile wipe still just skips the candidate.
            let Some(their_profile) = self.profiles.get_profile(candidate.id)? else {
                continue;
            };
            let breakdown = compute_compatibility(&self.config, &my_profile, &their_profile);
            let (course, year, faculty) = candidate.visible_attributes();
            feed.push(ScoredCandidate {
                user_id: candidate.id,
                display_name: candidate.display_name.clone(),
                course: course.map(|s| s.to_string()),
                year,
                faculty: faculty.map(|s| s.to_string()),
                compatibility_score: breakdown.score,
                top_artists: their_profile
                    .top_artists
                    .iter()
                    .take(FEED_TOP_ARTISTS)
                    .map(|a| a.name.clone())
                    .collect(),
                breakdown,
            });
        }

        feed.sort_by(|a, b| {
            b.compatibility_score
                .cmp(&a.compatibility_score)
                .then(a.user_id.cmp(&b.user_id))
        });
        Ok(feed)
    }

    pub fn matches_for_user(&self, user: usize) -> CoreResult<Vec<Match>> {
        Ok(self.store.matches_for_user(user)?)
    }

    pub fn get_match(&self, match_id: usize) -> CoreResult<Option<Match>> {
        Ok(self.store.get_match(match_id)?)
    }

    /// The match, verified to involve `user`.
    pub fn get_match_for(&self, match_id: usize, user: usize) -> CoreResult<Match> {
        let record = self
            .store
            .get_match(match_id)?
            .ok_or(CoreError::NotFound("Match"))?;
        if !record.involves(user) {
            return Err(CoreError::Forbidden("Not your match".to_string()));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::sqlite_store::SqliteMatchStore;
    use crate::playlist::SqlitePlaylistStore;
    use crate::profile::{build_music_profile, RecentTrack, SqliteProfileStore, TopArtist};
    use crate::user::{NewUser, SqliteUserStore};

    struct Fixture {
        _dir: tempfile::TempDir,
        engine: MatchEngine,
        users: Arc<SqliteUserStore>,
        profiles: Arc<SqliteProfileStore>,
        playlists: Arc<PlaylistManager>,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let users = Arc::new(SqliteUserStore::new(dir.path().join("users.db")).unwrap());
        let profiles = Arc::new(SqliteProfileStore::new(dir.path().join("profiles.db")).unwrap());
        let match_store = Arc::new(SqliteMatchStore::new(dir.path().join("matching.db")).unwrap());
        let playlist_store =
            Arc::new(SqlitePlaylistStore::new(dir.path().join("playlists.db")).unwrap());
        let playlists = Arc::new(PlaylistManager::new(
            playlist_store,
            users.clone(),
            profiles.clone(),
        ));
        let engine = MatchEngine::new(
            MatchingConfig::default(),
            users.clone(),
            profiles.clone(),
            match_store,
            playlists.clone(),
        );
        Fixture {
            _dir: dir,
            engine,
            users,
            profiles,
            playlists,
        }
    }

    fn add_user(f: &Fixture, email: &str, name: &str, course: Option<&str>) -> usize {
        f.users
            .create_user(&NewUser {
                email: email.to_string(),
                display_name: name.to_string(),
                student_id: None,
                course: course.map(|c| c.to_string()),
                year: None,
                faculty: None,
            })
            .unwrap()
    }

    fn sync_profile(f: &Fixture, user_id: usize, artist_ids: &[&str]) {
        let artists = artist_ids
            .iter()
            .enumerate()
            .map(|(i, id)| TopArtist {
                spotify_id: id.to_string(),
                name: format!("Artist {}", id),
                genres: vec!["rock".to_string()],
                image_url: None,
                rank: i + 1,
            })
            .collect();
        let profile = build_music_profile(user_id, artists, Vec::<RecentTrack>::new(), 0);
        f.profiles.upsert_profile(&profile).unwrap();
    }

    #[test]
    fn self_swipe_is_rejected() {
        let f = fixture();
        let alice = add_user(&f, "a@uni.edu", "Alice", None);
        let err = f.engine.record_swipe(alice, alice, SwipeAction::Like).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn second_swipe_on_same_pair_conflicts() {
        let f = fixture();
        let alice = add_user(&f, "a@uni.edu", "Alice", None);
        let bob = add_user(&f, "b@uni.edu", "Bob", None);

        f.engine.record_swipe(alice, bob, SwipeAction::Pass).unwrap();
        let err = f.engine.record_swipe(alice, bob, SwipeAction::Like).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn mutual_like_creates_exactly_one_match_and_playlist() {
        let f = fixture();
        let alice = add_user(&f, "a@uni.edu", "Alice", None);
        let bob = add_user(&f, "b@uni.edu", "Bob", None);
        sync_profile(&f, alice, &["x1", "x2"]);
        sync_profile(&f, bob, &["x1", "x3"]);

        let first = f.engine.record_swipe(alice, bob, SwipeAction::Like).unwrap();
        assert!(first.matched.is_none());

        let second = f.engine.record_swipe(bob, alice, SwipeAction::Like).unwrap();
        let record = second.matched.expect("mutual like forms a match");
        assert!(record.involves(alice) && record.involves(bob));
        assert!(record.compatibility_score > 0);

        // A redundant re-evaluation of the pair reuses the stored match.
        let again = f.engine.get_match_for_pair_test(alice, bob);
        assert_eq!(again.id, record.id);

        let playlist = f
            .playlists
            .seed_match_playlist(record.id, record.compatibility_score, bob, alice)
            .unwrap();
        assert_eq!(playlist.match_id, Some(record.id));
        assert_eq!(f.playlists.members(&playlist.id).unwrap().len(), 2);
    }

    #[test]
    fn like_then_pass_does_not_match() {
        let f = fixture();
        let alice = add_user(&f, "a@uni.edu", "Alice", None);
        let bob = add_user(&f, "b@uni.edu", "Bob", None);
        sync_profile(&f, alice, &["x1"]);
        sync_profile(&f, bob, &["x1"]);

        f.engine.record_swipe(alice, bob, SwipeAction::Like).unwrap();
        let outcome = f.engine.record_swipe(bob, alice, SwipeAction::Pass).unwrap();
        assert!(outcome.matched.is_none());
    }

    #[test]
    fn match_snapshot_is_not_recomputed() {
        let f = fixture();
        let alice = add_user(&f, "a@uni.edu", "Alice", None);
        let bob = add_user(&f, "b@uni.edu", "Bob", None);
        sync_profile(&f, alice, &["x1"]);
        sync_profile(&f, bob, &["x1"]);

        f.engine.record_swipe(alice, bob, SwipeAction::Like).unwrap();
        let outcome = f.engine.record_swipe(bob, alice, SwipeAction::Like).unwrap();
        let record = outcome.matched.unwrap();
        let score_at_match = record.compatibility_score;

        // The profiles change afterwards; the stored snapshot does not.
        sync_profile(&f, alice, &["y1", "y2", "y3"]);
        let fetched = f.engine.get_match(record.id).unwrap().unwrap();
        assert_eq!(fetched.compatibility_score, score_at_match);
    }

    #[test]
    fn candidates_exclude_self_swiped_and_profileless() {
        let f = fixture();
        let alice = add_user(&f, "a@uni.edu", "Alice", None);
        let bob = add_user(&f, "b@uni.edu", "Bob", None);
        let carol = add_user(&f, "c@uni.edu", "Carol", None);
        let _dave = add_user(&f, "d@uni.edu", "Dave", None); // never syncs
        sync_profile(&f, alice, &["x1"]);
        sync_profile(&f, bob, &["x1"]);
        sync_profile(&f, carol, &["x1"]);

        // Any swipe excludes the target from resurfacing, pass included.
        f.engine.record_swipe(alice, carol, SwipeAction::Pass).unwrap();

        let candidates = f
            .engine
            .select_candidates(alice, &CandidateFilters::default())
            .unwrap();
        let ids: Vec<usize> = candidates.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![bob]);
    }

    #[test]
    fn filters_are_conjunctive_exact_match() {
        let f = fixture();
        let alice = add_user(&f, "a@uni.edu", "Alice", Some("Physics"));
        let bob = add_user(&f, "b@uni.edu", "Bob", Some("Physics"));
        let carol = add_user(&f, "c@uni.edu", "Carol", Some("History"));
        sync_profile(&f, alice, &["x1"]);
        sync_profile(&f, bob, &["x1"]);
        sync_profile(&f, carol, &["x1"]);

        let filters = CandidateFilters {
            course: Some("Physics".to_string()),
            ..CandidateFilters::default()
        };
        let ids: Vec<usize> = f
            .engine
            .select_candidates(alice, &filters)
            .unwrap()
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![bob]);
    }

    #[test]
    fn feed_requires_a_synced_profile_and_ranks_by_score() {
        let f = fixture();
        let alice = add_user(&f, "a@uni.edu", "Alice", None);
        let bob = add_user(&f, "b@uni.edu", "Bob", None);
        let carol = add_user(&f, "c@uni.edu", "Carol", None);

        let err = f
            .engine
            .candidate_feed(alice, &CandidateFilters::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        sync_profile(&f, alice, &["x1", "x2"]);
        sync_profile(&f, bob, &["x1", "x2"]); // identical taste
        sync_profile(&f, carol, &["y1"]); // nothing in common

        let feed = f
            .engine
            .candidate_feed(alice, &CandidateFilters::default())
            .unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].user_id, bob);
        assert!(feed[0].compatibility_score > feed[1].compatibility_score);
    }

    #[test]
    fn feed_ties_break_by_ascending_user_id() {
        let f = fixture();
        let alice = add_user(&f, "a@uni.edu", "Alice", None);
        let bob = add_user(&f, "b@uni.edu", "Bob", None);
        let carol = add_user(&f, "c@uni.edu", "Carol", None);
        sync_profile(&f, alice, &["x1"]);
        // Identical profiles score identically against alice.
        sync_profile(&f, bob, &["x1"]);
        sync_profile(&f, carol, &["x1"]);

        let feed = f
            .engine
            .candidate_feed(alice, &CandidateFilters::default())
            .unwrap();
        let ids: Vec<usize> = feed.iter().map(|c| c.user_id).collect();
        assert_eq!(ids, vec![bob, carol]);
    }

    impl MatchEngine {
        fn get_match_for_pair_test(&self, a: usize, b: usize) -> Match {
            self.store.get_match_for_pair(a, b).unwrap().unwrap()
        }
    }
}
