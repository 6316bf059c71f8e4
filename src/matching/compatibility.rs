//! Compatibility scoring
//!
//! The one reproducible unit everything else leans on: two profiles in, a
//! 0-100 score and its breakdown out. Deterministic, no I/O, tolerant of
//! empty profiles (every denominator is floored at 1).

use super::models::{MatchingConfig, ScoreResult};
use crate::profile::MusicProfile;
use std::collections::{BTreeSet, HashMap};

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Similarity of two counts: 1 when equal, shrinking with relative
/// distance, 1 when both are zero.
fn count_similarity(x1: usize, x2: usize) -> f64 {
    let denom = x1.max(x2).max(1) as f64;
    1.0 - (x1 as f64 - x2 as f64).abs() / denom
}

/// Computes the compatibility score between two music profiles.
///
/// Components:
/// - artist overlap: |ids(A) ∩ ids(B)| / max(|ids(A)|, |ids(B)|, 1)
/// - genre overlap: Jaccard over the top-genre tag sets, denominator
///   floored at 1
/// - listening-pattern similarity: count similarity of total_artists and
///   total_genres, averaged
///
/// The weighted sum is clamped to 0..100 and rounded with `f64::round`
/// (round-half-away-from-zero). Two fully empty profiles score the pattern
/// floor (pattern similarity 1.0, so 20 with default weights).
///
/// Shared artist names and genres are returned sorted so identical inputs
/// always yield byte-identical breakdowns.
pub fn compute_compatibility(
    config: &MatchingConfig,
    a: &MusicProfile,
    b: &MusicProfile,
) -> ScoreResult {
    let ids_a: BTreeSet<&str> = a.top_artists.iter().map(|x| x.spotify_id.as_str()).collect();
    let ids_b: BTreeSet<&str> = b.top_artists.iter().map(|x| x.spotify_id.as_str()).collect();

    let names_a: HashMap<&str, &str> = a
        .top_artists
        .iter()
        .map(|x| (x.spotify_id.as_str(), x.name.as_str()))
        .collect();
    let names_b: HashMap<&str, &str> = b
        .top_artists
        .iter()
        .map(|x| (x.spotify_id.as_str(), x.name.as_str()))
        .collect();

    let shared_ids: Vec<&str> = ids_a.intersection(&ids_b).copied().collect();
    let mut shared_artists: Vec<String> = shared_ids
        .iter()
        .filter_map(|id| names_a.get(id).or_else(|| names_b.get(id)))
        .map(|name| name.to_string())
        .collect();
    shared_artists.sort();

    let max_artists = ids_a.len().max(ids_b.len()).max(1);
    let artist_overlap_pct = shared_ids.len() as f64 / max_artists as f64;

    let genres_a: BTreeSet<&str> = a.top_genres.iter().map(|g| g.genre.as_str()).collect();
    let genres_b: BTreeSet<&str> = b.top_genres.iter().map(|g| g.genre.as_str()).collect();
    let shared_genres: Vec<String> = genres_a
        .intersection(&genres_b)
        .map(|g| g.to_string())
        .collect();
    let genre_union = genres_a.union(&genres_b).count();
    let genre_overlap_pct = shared_genres.len() as f64 / genre_union.max(1) as f64;

    let pattern_sim = (count_similarity(
        a.listening_patterns.total_artists,
        b.listening_patterns.total_artists,
    ) + count_similarity(
        a.listening_patterns.total_genres,
        b.listening_patterns.total_genres,
    )) / 2.0;

    let raw = artist_overlap_pct * config.artist_weight
        + genre_overlap_pct * config.genre_weight
        + pattern_sim * config.pattern_weight;
    let score = raw.clamp(0.0, 100.0).round() as u8;

    ScoreResult {
        score,
        shared_artists,
        shared_genres,
        genre_overlap_pct: round3(genre_overlap_pct),
        artist_overlap_pct: round3(artist_overlap_pct),
    }
}
