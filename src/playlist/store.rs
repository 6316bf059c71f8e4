use super::models::{
    MemberRole, PlaylistMember, PlaylistTrack, SharedPlaylist, WeeklyRecap,
};
use super::recap::RecapData;
use anyhow::Result;
use chrono::NaiveDate;

/// Playlist metadata for creation; tracks and members are added through
/// their own operations.
#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub id: String,
    pub match_id: Option<usize>,
    pub name: String,
    pub description: Option<String>,
    pub kind: super::models::PlaylistKind,
    pub created_by: usize,
}

pub trait PlaylistStore: Send + Sync {
    /// Inserts a playlist row. Fails if a playlist already exists for the
    /// same match (store-level idempotence backstop for seeding).
    fn create_playlist(&self, playlist: &NewPlaylist) -> Result<()>;

    /// Returns Ok(None) for missing or soft-deleted playlists.
    fn get_playlist(&self, playlist_id: &str) -> Result<Option<SharedPlaylist>>;

    /// The active playlist seeded for a match, if any.
    fn get_playlist_by_match(&self, match_id: usize) -> Result<Option<SharedPlaylist>>;

    /// Active playlists the user is a member of, most recently updated
    /// first.
    fn playlists_for_user(&self, user_id: usize) -> Result<Vec<SharedPlaylist>>;

    /// Soft-deletes a playlist. Returns false if it was already gone.
    fn soft_delete_playlist(&self, playlist_id: &str) -> Result<bool>;

    /// Appends a track. Returns false when the spotify_id is already
    /// present (atomic insert-or-reject).
    fn add_track(&self, playlist_id: &str, track: &PlaylistTrack) -> Result<bool>;

    /// Removes a track by spotify_id. Returns false when it was absent.
    fn remove_track(&self, playlist_id: &str, spotify_id: &str) -> Result<bool>;

    /// Adds a member. Returns false when (playlist, user) already exists.
    fn add_member(&self, playlist_id: &str, user_id: usize, role: MemberRole) -> Result<bool>;

    /// Removes a member. Returns false when there was nothing to remove.
    fn remove_member(&self, playlist_id: &str, user_id: usize) -> Result<bool>;

    fn get_member(&self, playlist_id: &str, user_id: usize) -> Result<Option<PlaylistMember>>;

    fn get_members(&self, playlist_id: &str) -> Result<Vec<PlaylistMember>>;

    /// The stored recap for (playlist, week_start), if one exists.
    fn get_recap(&self, playlist_id: &str, week_start: NaiveDate) -> Result<Option<WeeklyRecap>>;

    /// Stores a freshly computed recap and returns it with its id.
    fn insert_recap(
        &self,
        playlist_id: &str,
        week_start: NaiveDate,
        data: &RecapData,
    ) -> Result<WeeklyRecap>;
}
