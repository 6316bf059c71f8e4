//! Profile data sources
//!
//! The core never branches on where listening data came from: a
//! `ProfileSource` hands back raw records and the extractor does the rest.
//! `SyntheticProfileSource` backs local development when no streaming
//! provider is wired up; its output is a pure function of the user id so
//! repeated syncs are stable.

use super::models::{RecentTrack, TopArtist};

pub trait ProfileSource: Send + Sync {
    /// Raw top-artist and recently-played records for a user, in provider
    /// order.
    fn fetch_raw(&self, user_id: usize) -> (Vec<TopArtist>, Vec<RecentTrack>);
}

/// Fixture pool mirroring what a real provider returns.
const ARTIST_POOL: &[(&str, &str, &[&str])] = &[
    ("7Ln80lUS6He07XvHI8qqHH", "Arctic Monkeys", &["indie rock", "rock", "sheffield indie"]),
    ("5INjqkS1o8h1imAzPqGZBb", "Tame Impala", &["psychedelic rock", "indie rock", "neo-psychedelia"]),
    ("2YZyLoL8N0Wb9xBt1NhZWg", "Kendrick Lamar", &["hip hop", "rap", "west coast rap"]),
    ("5cj0lLjcoR7YOSnhnX0Po5", "Doja Cat", &["pop", "dance pop", "rap"]),
    ("1Xyo4u8uXC1ZmMpatF05PJ", "The Weeknd", &["r&b", "pop", "canadian pop"]),
    ("4V8LLVI7PbaPR0K2TGSxFF", "Tyler, The Creator", &["hip hop", "rap", "alternative hip hop"]),
    ("2h93pZq0e7k5yf4dywlkpM", "Frank Ocean", &["r&b", "alternative r&b", "neo soul"]),
    ("7tYKF4w9nC0nq9CsPZTHyP", "SZA", &["r&b", "pop", "alternative r&b"]),
    ("4Z8W4fKeB5YxbusRsdQVPb", "Radiohead", &["alternative rock", "art rock", "electronic"]),
    ("57vWImR43h4CaDao012Ofp", "Steve Lacy", &["r&b", "indie soul", "bedroom pop"]),
    ("6qqNVTkY8uBg9cP3Jd7DAH", "Billie Eilish", &["pop", "electropop", "art pop"]),
    ("3Sz7ZnJQBIHsXLUSo0OQtM", "Mac DeMarco", &["indie rock", "lo-fi", "slacker rock"]),
];

const TRACK_POOL: &[(&str, &str, &str, &str)] = &[
    ("m1", "Do I Wanna Know?", "Arctic Monkeys", "AM"),
    ("m2", "The Less I Know The Better", "Tame Impala", "Currents"),
    ("m3", "HUMBLE.", "Kendrick Lamar", "DAMN."),
    ("m4", "Say So", "Doja Cat", "Hot Pink"),
    ("m5", "Blinding Lights", "The Weeknd", "After Hours"),
    ("m6", "EARFQUAKE", "Tyler, The Creator", "IGOR"),
    ("m7", "Nights", "Frank Ocean", "Blonde"),
    ("m8", "Kill Bill", "SZA", "SOS"),
    ("m9", "Creep", "Radiohead", "Pablo Honey"),
    ("m10", "Bad Habit", "Steve Lacy", "Gemini Rights"),
];

pub struct SyntheticProfileSource;

/// Small multiplicative congruential step; good enough to vary fixture
/// selection per user while staying reproducible.
fn lcg_next(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    *state >> 33
}

impl ProfileSource for SyntheticProfileSource {
    fn fetch_raw(&self, user_id: usize) -> (Vec<TopArtist>, Vec<RecentTrack>) {
        let mut state = user_id as u64 ^ 0x9E3779B97F4A7C15;
        // Burn one step so small user ids diverge quickly.
        lcg_next(&mut state);

        let artist_count = 6 + (lcg_next(&mut state) % 7) as usize;
        let offset = (lcg_next(&mut state) % ARTIST_POOL.len() as u64) as usize;
        let top_artists: Vec<TopArtist> = (0..artist_count.min(ARTIST_POOL.len()))
            .map(|i| {
                let (id, name, genres) = ARTIST_POOL[(offset + i) % ARTIST_POOL.len()];
                TopArtist {
                    spotify_id: id.to_string(),
                    name: name.to_string(),
                    genres: genres.iter().map(|g| g.to_string()).collect(),
                    image_url: None,
                    rank: i + 1,
                }
            })
            .collect();

        let track_count = 5 + (lcg_next(&mut state) % 6) as usize;
        let track_offset = (lcg_next(&mut state) % TRACK_POOL.len() as u64) as usize;
        let recent_tracks: Vec<RecentTrack> = (0..track_count.min(TRACK_POOL.len()))
            .map(|i| {
                let (id, name, artist, album) = TRACK_POOL[(track_offset + i) % TRACK_POOL.len()];
                RecentTrack {
                    spotify_id: id.to_string(),
                    name: name.to_string(),
                    artist: artist.to_string(),
                    album: album.to_string(),
                    image_url: None,
                    played_at: None,
                }
            })
            .collect();

        (top_artists, recent_tracks)
    }
}
