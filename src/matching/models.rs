//! Matching data models

use serde::{Deserialize, Serialize};

/// Weights for the compatibility score, passed in at construction so the
/// scorer never reads ambient configuration.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    pub artist_weight: f64,
    pub genre_weight: f64,
    pub pattern_weight: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            artist_weight: 40.0,
            genre_weight: 40.0,
            pattern_weight: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeAction {
    Like,
    Pass,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "like",
            SwipeAction::Pass => "pass",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(SwipeAction::Like),
            "pass" => Some(SwipeAction::Pass),
            _ => None,
        }
    }
}

/// A directed swipe decision. Immutable once created; at most one exists
/// per ordered (user, target) pair.
#[derive(Debug, Clone, Serialize)]
pub struct Swipe {
    pub id: usize,
    pub user_id: usize,
    pub target_user_id: usize,
    pub action: SwipeAction,
    /// Unix timestamp.
    pub created_at: i64,
}

/// A compatibility score with its explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub shared_artists: Vec<String>,
    pub shared_genres: Vec<String>,
    pub genre_overlap_pct: f64,
    pub artist_overlap_pct: f64,
}

impl ScoreResult {
    pub fn zero() -> Self {
        ScoreResult {
            score: 0,
            shared_artists: Vec::new(),
            shared_genres: Vec::new(),
            genre_overlap_pct: 0.0,
            artist_overlap_pct: 0.0,
        }
    }
}

/// A mutual match. Permanent; the score/breakdown snapshot is taken at
/// match time and never recomputed. The pair is stored with the lower user
/// id first, but consumers must still check membership both ways.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub id: usize,
    pub user1_id: usize,
    pub user2_id: usize,
    pub compatibility_score: u8,
    pub breakdown: ScoreResult,
    /// Unix timestamp.
    pub created_at: i64,
}

impl Match {
    pub fn involves(&self, user_id: usize) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    pub fn other_user(&self, user_id: usize) -> usize {
        if self.user1_id == user_id {
            self.user2_id
        } else {
            self.user1_id
        }
    }
}

/// Conjunctive exact-match attribute filters for candidate selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateFilters {
    pub course: Option<String>,
    pub year: Option<u32>,
    pub faculty: Option<String>,
}

/// Outcome of recording a swipe.
#[derive(Debug, Clone)]
pub struct SwipeOutcome {
    pub swipe: Swipe,
    /// Present when the swipe completed a mutual like.
    pub matched: Option<Match>,
}

/// A feed entry: a candidate with the score against the requesting user.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub user_id: usize,
    pub display_name: String,
    pub course: Option<String>,
    pub year: Option<u32>,
    pub faculty: Option<String>,
    pub compatibility_score: u8,
    pub breakdown: ScoreResult,
    /// The candidate's top artist names, capped for display.
    pub top_artists: Vec<String>,
}
