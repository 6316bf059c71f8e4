//! Weekly recap computation
//!
//! Read-triggered: the manager asks for the current week's recap and
//! computes one through here when none is stored yet. The week starts on
//! Monday, UTC.

use super::models::{RecapTrack, SharedPlaylist};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

/// The Monday of the ISO week containing `now`, as a UTC date.
pub fn week_start_for(now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    today - Days::new(today.weekday().num_days_from_monday() as u64)
}

#[derive(Debug, Clone)]
pub struct RecapData {
    pub tracks_added: usize,
    pub top_contributor: Option<usize>,
    pub total_tracks: usize,
    pub week_tracks: Vec<RecapTrack>,
}

/// Summarizes the playlist's activity for the week starting at
/// `week_start`: tracks whose insertion timestamp falls on or after the
/// week start, per-contributor counts, and the leading contributor.
/// Contributor ties go to the lowest user id.
pub fn compute_recap(playlist: &SharedPlaylist, week_start: NaiveDate) -> RecapData {
    let week_start_ts = week_start
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
        .timestamp();

    let mut contributor_counts: std::collections::BTreeMap<usize, usize> =
        std::collections::BTreeMap::new();
    let mut week_tracks = Vec::new();
    for track in &playlist.tracks {
        if track.added_at < week_start_ts {
            continue;
        }
        *contributor_counts.entry(track.added_by).or_insert(0) += 1;
        week_tracks.push(RecapTrack {
            track_name: track.track_name.clone(),
            artist: track.artist.clone(),
        });
    }

    // BTreeMap iteration is id-ascending, and the strict comparison keeps
    // the first (lowest id) of any tied contributors.
    let top_contributor = contributor_counts
        .iter()
        .fold(None::<(usize, usize)>, |best, (&id, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((id, count)),
        })
        .map(|(id, _)| id);

    RecapData {
        tracks_added: week_tracks.len(),
        top_contributor,
        total_tracks: playlist.tracks.len(),
        week_tracks,
    }
}
