//! Initial track selection for match playlists
//!
//! Pure selection logic; the manager persists what this picks. The shared
//! set is computed from top-artist identifiers (the same set the match
//! breakdown intersects) and recent tracks are matched through the shared
//! artists' display names.

use crate::profile::MusicProfile;
use std::collections::{HashMap, HashSet};

/// A selected seed track with its contributing user.
#[derive(Debug, Clone)]
pub struct SeedTrack {
    pub spotify_id: String,
    pub track_name: String,
    pub artist: String,
    pub album: String,
    pub image_url: Option<String>,
    pub contributed_by: usize,
}

/// Picks the initial track set for a freshly matched pair: every recent
/// track by an artist both users have in their top lists, pooled as A's
/// recent plays followed by B's, deduplicated by track id with the first
/// occurrence winning.
pub fn select_seed_tracks(a: &MusicProfile, b: &MusicProfile) -> Vec<SeedTrack> {
    let ids_a: HashSet<&str> = a.top_artists.iter().map(|x| x.spotify_id.as_str()).collect();
    let names_by_id: HashMap<&str, &str> = a
        .top_artists
        .iter()
        .chain(b.top_artists.iter())
        .map(|x| (x.spotify_id.as_str(), x.name.as_str()))
        .collect();

    let shared_names: HashSet<&str> = b
        .top_artists
        .iter()
        .filter(|x| ids_a.contains(x.spotify_id.as_str()))
        .filter_map(|x| names_by_id.get(x.spotify_id.as_str()).copied())
        .collect();

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut tracks = Vec::new();
    let pool = a
        .recent_tracks
        .iter()
        .map(|t| (t, a.user_id))
        .chain(b.recent_tracks.iter().map(|t| (t, b.user_id)));

    for (track, contributed_by) in pool {
        if !shared_names.contains(track.artist.as_str()) {
            continue;
        }
        if !seen_ids.insert(track.spotify_id.as_str()) {
            continue;
        }
        tracks.push(SeedTrack {
            spotify_id: track.spotify_id.clone(),
            track_name: track.name.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            image_url: track.image_url.clone(),
            contributed_by,
        });
    }

    tracks
}
