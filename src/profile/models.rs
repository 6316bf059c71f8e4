//! Music profile data models
//!
//! Raw listening data arrives from the streaming-data collaborator already
//! fetched; the extractor in this module's sibling turns it into the
//! comparison-ready shape stored per user.

use serde::{Deserialize, Serialize};

/// One entry of a user's ranked top-artist list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopArtist {
    pub spotify_id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub image_url: Option<String>,
    /// 1-based position in the user's ranking.
    pub rank: usize,
}

/// A genre tag with its occurrence count across the user's top artists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopGenre {
    pub genre: String,
    pub count: usize,
}

/// A recently played track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTrack {
    pub spotify_id: String,
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub album: String,
    pub image_url: Option<String>,
    /// Unix timestamp of the play, when the provider reported one.
    pub played_at: Option<i64>,
}

/// Aggregate listening statistics derived from the top-artist list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListeningPatterns {
    pub total_artists: usize,
    pub total_genres: usize,
    pub top_genre: Option<String>,
    pub avg_popularity: f64,
}

/// A user's comparison-ready feature set.
///
/// Replaced wholesale on each sync; absence means the user has not synced
/// yet and is neither scored nor surfaced as a candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicProfile {
    pub user_id: usize,
    pub top_artists: Vec<TopArtist>,
    pub top_genres: Vec<TopGenre>,
    pub recent_tracks: Vec<RecentTrack>,
    pub listening_patterns: ListeningPatterns,
    /// Unix timestamp of the last sync.
    pub last_synced: i64,
}

impl MusicProfile {
    /// An empty profile for a user; scores 0 against everything.
    pub fn empty(user_id: usize) -> Self {
        MusicProfile {
            user_id,
            top_artists: Vec::new(),
            top_genres: Vec::new(),
            recent_tracks: Vec::new(),
            listening_patterns: ListeningPatterns::default(),
            last_synced: 0,
        }
    }
}
