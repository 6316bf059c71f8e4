//! Playlist operations
//!
//! All mutation paths run through here so the membership and uniqueness
//! rules live in one place. Seeding for a fresh match is invoked by the
//! match engine and is idempotent per match.

use super::models::{
    MemberRole, NewTrack, PlaylistKind, PlaylistMember, PlaylistTrack, SharedPlaylist, WeeklyRecap,
};
use super::recap::{compute_recap, week_start_for};
use super::seeder::select_seed_tracks;
use super::store::{NewPlaylist, PlaylistStore};
use crate::error::{CoreError, CoreResult};
use crate::profile::{MusicProfile, ProfileStore};
use crate::user::UserStore;
use chrono::Utc;
use rand::Rng;
use rand_distr::Alphanumeric;
use std::sync::Arc;
use tracing::info;

/// A random A-z0-9 string, used for playlist ids.
fn random_string(len: usize) -> String {
    let bytes = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .collect::<Vec<u8>>();
    String::from_utf8_lossy(&bytes).to_string()
}

pub struct PlaylistManager {
    store: Arc<dyn PlaylistStore>,
    users: Arc<dyn UserStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl PlaylistManager {
    pub fn new(
        store: Arc<dyn PlaylistStore>,
        users: Arc<dyn UserStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        PlaylistManager {
            store,
            users,
            profiles,
        }
    }

    fn display_name(&self, user_id: usize) -> CoreResult<String> {
        Ok(self
            .users
            .get_user(user_id)?
            .ok_or(CoreError::NotFound("User"))?
            .display_name)
    }

    fn profile_or_empty(&self, user_id: usize) -> CoreResult<MusicProfile> {
        Ok(self
            .profiles
            .get_profile(user_id)?
            .unwrap_or_else(|| MusicProfile::empty(user_id)))
    }

    fn require_member(&self, playlist_id: &str, user_id: usize) -> CoreResult<PlaylistMember> {
        self.store
            .get_member(playlist_id, user_id)?
            .ok_or_else(|| CoreError::Forbidden("Not a member of this playlist".to_string()))
    }

    /// Creates the shared playlist for a newly formed match. Returns the
    /// existing playlist when one is already seeded for the match.
    ///
    /// The initial tracks come from both users' recent plays restricted to
    /// the artists their top lists share; `user_a` is the user whose swipe
    /// completed the match and leads the playlist name.
    pub fn seed_match_playlist(
        &self,
        match_id: usize,
        score: u8,
        user_a: usize,
        user_b: usize,
    ) -> CoreResult<SharedPlaylist> {
        if let Some(existing) = self.store.get_playlist_by_match(match_id)? {
            return Ok(existing);
        }

        let name_a = self.display_name(user_a)?;
        let name_b = self.display_name(user_b)?;
        let profile_a = self.profile_or_empty(user_a)?;
        let profile_b = self.profile_or_empty(user_b)?;

        let playlist = NewPlaylist {
            id: random_string(16),
            match_id: Some(match_id),
            name: format!("{} & {}'s Mix", name_a, name_b),
            description: Some(format!(
                "Shared playlist from your {}% music match!",
                score
            )),
            kind: PlaylistKind::Match,
            created_by: user_a,
        };
        if let Err(err) = self.store.create_playlist(&playlist) {
            // A concurrent completion of the same match can win the insert;
            // the unique constraint on match_id makes that visible here.
            if let Some(existing) = self.store.get_playlist_by_match(match_id)? {
                return Ok(existing);
            }
            return Err(err.into());
        }

        let now = Utc::now().timestamp();
        for seed in select_seed_tracks(&profile_a, &profile_b) {
            self.store.add_track(
                &playlist.id,
                &PlaylistTrack {
                    spotify_id: seed.spotify_id,
                    track_name: seed.track_name,
                    artist: seed.artist,
                    album: seed.album,
                    image_url: seed.image_url,
                    spotify_url: None,
                    added_by: seed.contributed_by,
                    added_at: now,
                },
            )?;
        }

        self.store.add_member(&playlist.id, user_a, MemberRole::Owner)?;
        self.store.add_member(&playlist.id, user_b, MemberRole::Owner)?;

        info!("Seeded playlist {} for match {}", playlist.id, match_id);
        self.store
            .get_playlist(&playlist.id)?
            .ok_or(CoreError::NotFound("Playlist"))
    }

    pub fn create_group_playlist(
        &self,
        creator: usize,
        name: String,
        description: Option<String>,
        member_ids: Vec<usize>,
    ) -> CoreResult<SharedPlaylist> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Playlist name cannot be empty".to_string(),
            ));
        }

        let playlist = NewPlaylist {
            id: random_string(16),
            match_id: None,
            name,
            description,
            kind: PlaylistKind::Group,
            created_by: creator,
        };
        self.store.create_playlist(&playlist)?;
        self.store.add_member(&playlist.id, creator, MemberRole::Owner)?;

        for user_id in member_ids {
            if user_id == creator {
                continue;
            }
            if self.users.get_user(user_id)?.is_some() {
                self.store.add_member(&playlist.id, user_id, MemberRole::Editor)?;
            }
        }

        self.store
            .get_playlist(&playlist.id)?
            .ok_or(CoreError::NotFound("Playlist"))
    }

    pub fn get_playlist_for(&self, playlist_id: &str, user_id: usize) -> CoreResult<SharedPlaylist> {
        let playlist = self
            .store
            .get_playlist(playlist_id)?
            .ok_or(CoreError::NotFound("Playlist"))?;
        self.require_member(playlist_id, user_id)?;
        Ok(playlist)
    }

    pub fn playlists_for_user(&self, user_id: usize) -> CoreResult<Vec<SharedPlaylist>> {
        Ok(self.store.playlists_for_user(user_id)?)
    }

    pub fn members(&self, playlist_id: &str) -> CoreResult<Vec<PlaylistMember>> {
        Ok(self.store.get_members(playlist_id)?)
    }

    pub fn add_track(
        &self,
        playlist_id: &str,
        user_id: usize,
        track: NewTrack,
    ) -> CoreResult<SharedPlaylist> {
        if track.spotify_id.is_empty() {
            return Err(CoreError::Validation("spotify_id is required".to_string()));
        }
        self.store
            .get_playlist(playlist_id)?
            .ok_or(CoreError::NotFound("Playlist"))?;
        self.require_member(playlist_id, user_id)?;

        let stamped = PlaylistTrack {
            spotify_id: track.spotify_id,
            track_name: track.track_name,
            artist: track.artist,
            album: track.album,
            image_url: track.image_url,
            spotify_url: track.spotify_url,
            added_by: user_id,
            added_at: Utc::now().timestamp(),
        };
        if !self.store.add_track(playlist_id, &stamped)? {
            return Err(CoreError::Conflict("Track already in playlist".to_string()));
        }

        self.store
            .get_playlist(playlist_id)?
            .ok_or(CoreError::NotFound("Playlist"))
    }

    /// Removing a track that is not present is a no-op returning the
    /// unchanged playlist.
    pub fn remove_track(
        &self,
        playlist_id: &str,
        user_id: usize,
        spotify_id: &str,
    ) -> CoreResult<SharedPlaylist> {
        self.store
            .get_playlist(playlist_id)?
            .ok_or(CoreError::NotFound("Playlist"))?;
        self.require_member(playlist_id, user_id)?;
        self.store.remove_track(playlist_id, spotify_id)?;
        self.store
            .get_playlist(playlist_id)?
            .ok_or(CoreError::NotFound("Playlist"))
    }

    pub fn add_member(
        &self,
        playlist_id: &str,
        actor: usize,
        new_member: usize,
    ) -> CoreResult<SharedPlaylist> {
        let playlist = self
            .store
            .get_playlist(playlist_id)?
            .ok_or(CoreError::NotFound("Playlist"))?;
        if playlist.kind != PlaylistKind::Group {
            return Err(CoreError::Validation(
                "Can only add members to group playlists".to_string(),
            ));
        }
        let member = self.require_member(playlist_id, actor)?;
        if member.role != MemberRole::Owner {
            return Err(CoreError::Forbidden(
                "Only the owner can add members".to_string(),
            ));
        }
        if self.users.get_user(new_member)?.is_none() {
            return Err(CoreError::NotFound("User"));
        }
        if !self.store.add_member(playlist_id, new_member, MemberRole::Editor)? {
            return Err(CoreError::Conflict("User is already a member".to_string()));
        }
        Ok(playlist)
    }

    pub fn remove_member(
        &self,
        playlist_id: &str,
        actor: usize,
        user_id: usize,
    ) -> CoreResult<SharedPlaylist> {
        let playlist = self
            .store
            .get_playlist(playlist_id)?
            .ok_or(CoreError::NotFound("Playlist"))?;
        if playlist.kind != PlaylistKind::Group {
            return Err(CoreError::Validation(
                "Can only remove members from group playlists".to_string(),
            ));
        }
        let member = self.require_member(playlist_id, actor)?;
        if member.role != MemberRole::Owner {
            return Err(CoreError::Forbidden(
                "Only the owner can remove members".to_string(),
            ));
        }
        if user_id == actor {
            return Err(CoreError::Validation(
                "Cannot remove yourself. Delete the playlist instead".to_string(),
            ));
        }
        if !self.store.remove_member(playlist_id, user_id)? {
            return Err(CoreError::NotFound("Member"));
        }
        Ok(playlist)
    }

    pub fn delete_playlist(&self, playlist_id: &str, actor: usize) -> CoreResult<()> {
        self.store
            .get_playlist(playlist_id)?
            .ok_or(CoreError::NotFound("Playlist"))?;
        let member = self.require_member(playlist_id, actor)?;
        if member.role != MemberRole::Owner {
            return Err(CoreError::Forbidden(
                "Only the owner can delete the playlist".to_string(),
            ));
        }
        self.store.soft_delete_playlist(playlist_id)?;
        Ok(())
    }

    /// Returns the recap for the current week, computing and storing it on
    /// first request. A new week gets a new recap; older ones stay on
    /// record untouched.
    pub fn get_or_generate_recap(
        &self,
        playlist_id: &str,
        user_id: usize,
    ) -> CoreResult<WeeklyRecap> {
        let playlist = self
            .store
            .get_playlist(playlist_id)?
            .ok_or(CoreError::NotFound("Playlist"))?;
        self.require_member(playlist_id, user_id)?;

        let week_start = week_start_for(Utc::now());
        if let Some(existing) = self.store.get_recap(playlist_id, week_start)? {
            return Ok(existing);
        }

        let data = compute_recap(&playlist, week_start);
        Ok(self.store.insert_recap(playlist_id, week_start, &data)?)
    }
}
