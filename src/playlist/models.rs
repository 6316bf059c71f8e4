//! Shared playlist data models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistKind {
    /// Auto-created for a match; exactly two owners, membership never
    /// edited.
    Match,
    /// Created explicitly; owners may add and remove editors.
    Group,
}

impl PlaylistKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistKind::Match => "match",
            PlaylistKind::Group => "group",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "match" => Some(PlaylistKind::Match),
            "group" => Some(PlaylistKind::Group),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Editor,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Editor => "editor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(MemberRole::Owner),
            "editor" => Some(MemberRole::Editor),
            _ => None,
        }
    }
}

/// A track inside a playlist, stamped with who added it and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub spotify_id: String,
    pub track_name: String,
    pub artist: String,
    #[serde(default)]
    pub album: String,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
    pub added_by: usize,
    /// Unix timestamp of insertion.
    pub added_at: i64,
}

/// Track fields as submitted by a member; stamping happens server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrack {
    pub spotify_id: String,
    pub track_name: String,
    pub artist: String,
    #[serde(default)]
    pub album: String,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SharedPlaylist {
    pub id: String,
    pub match_id: Option<usize>,
    pub name: String,
    pub description: Option<String>,
    pub kind: PlaylistKind,
    pub created_by: usize,
    pub tracks: Vec<PlaylistTrack>,
    pub is_active: bool,
    /// Unix timestamps.
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistMember {
    pub playlist_id: String,
    pub user_id: usize,
    pub role: MemberRole,
    /// Unix timestamp.
    pub joined_at: i64,
}

/// A per-week activity summary for a playlist. Append-only; one row per
/// (playlist, week_start).
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyRecap {
    pub id: usize,
    pub playlist_id: String,
    /// Monday of the summarized ISO week, UTC.
    pub week_start: chrono::NaiveDate,
    pub tracks_added: usize,
    pub top_contributor: Option<usize>,
    pub total_tracks: usize,
    pub week_tracks: Vec<RecapTrack>,
    /// Unix timestamp.
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapTrack {
    pub track_name: String,
    pub artist: String,
}
