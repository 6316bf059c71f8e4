//! Profile feature extraction
//!
//! Pure transform from raw provider records to the stored profile shape.
//! No storage or network access happens here.

use super::models::{ListeningPatterns, MusicProfile, RecentTrack, TopArtist, TopGenre};

/// How many genres the profile keeps, highest occurrence count first.
pub const TOP_GENRES_LIMIT: usize = 15;

/// Builds the comparison-ready profile fields from raw top-artist and
/// recently-played records.
///
/// Genre tags are tallied across all top artists; the 15 highest-count
/// genres are kept, ties broken by first-encountered order (the sort on
/// count is stable).
pub fn build_music_profile(
    user_id: usize,
    top_artists: Vec<TopArtist>,
    recent_tracks: Vec<RecentTrack>,
    synced_at: i64,
) -> MusicProfile {
    // Tally in first-encountered order so the tie-break is stable.
    let mut genre_order: Vec<String> = Vec::new();
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for artist in &top_artists {
        for genre in &artist.genres {
            if !counts.contains_key(genre) {
                genre_order.push(genre.clone());
            }
            *counts.entry(genre.clone()).or_insert(0) += 1;
        }
    }

    let total_genres = genre_order.len();
    let mut top_genres: Vec<TopGenre> = genre_order
        .into_iter()
        .map(|genre| {
            let count = counts[&genre];
            TopGenre { genre, count }
        })
        .collect();
    top_genres.sort_by(|a, b| b.count.cmp(&a.count));
    top_genres.truncate(TOP_GENRES_LIMIT);

    let listening_patterns = ListeningPatterns {
        total_artists: top_artists.len(),
        total_genres,
        top_genre: top_genres.first().map(|g| g.genre.clone()),
        avg_popularity: 0.0,
    };

    MusicProfile {
        user_id,
        top_artists,
        top_genres,
        recent_tracks,
        listening_patterns,
        last_synced: synced_at,
    }
}
