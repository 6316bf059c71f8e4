//! Raw listening-data payloads for profile sync
//!
//! Sync bodies are built as JSON values so tests exercise the same
//! deserialization path real collaborator payloads take.

use serde_json::{json, Value};

/// A raw recently-played record.
pub fn raw_track(spotify_id: &str, name: &str, artist: &str) -> Value {
    json!({
        "spotify_id": spotify_id,
        "name": name,
        "artist": artist,
        "album": "Some Album",
    })
}

/// A raw sync payload: top artists (id, name, genre tags) plus recent
/// tracks. Ranks are assigned by position.
pub fn raw_profile(artists: &[(&str, &str, &[&str])], tracks: &[Value]) -> Value {
    let top_artists: Vec<Value> = artists
        .iter()
        .enumerate()
        .map(|(i, (id, name, genres))| {
            json!({
                "spotify_id": id,
                "name": name,
                "genres": genres,
                "rank": i + 1,
            })
        })
        .collect();
    json!({
        "top_artists": top_artists,
        "recent_tracks": tracks,
    })
}
