use super::models::{ListeningPatterns, MusicProfile, RecentTrack, TopArtist, TopGenre};
use super::store::ProfileStore;
use crate::sqlite_persistence::{open_versioned, Column, SqlType, Table, VersionedSchema};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

// Profile payloads are stored as JSON text, one row per user. The sync
// path always replaces the whole row, matching the replace-never-merge
// contract.
const MUSIC_PROFILE_TABLE: Table = Table {
    name: "music_profile",
    columns: &[
        Column::new("user_id", SqlType::Integer).primary_key(),
        Column::new("top_artists", SqlType::Text).non_null(),
        Column::new("top_genres", SqlType::Text).non_null(),
        Column::new("recent_tracks", SqlType::Text).non_null(),
        Column::new("listening_patterns", SqlType::Text).non_null(),
        Column::new("last_synced", SqlType::Integer).non_null(),
    ],
    uniques: &[],
    indices: &[],
};

const SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[MUSIC_PROFILE_TABLE],
    migration: None,
}];

#[derive(Clone)]
pub struct SqliteProfileStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProfileStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(db_path, SCHEMAS).context("Failed to open profile store")?;
        Ok(SqliteProfileStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl ProfileStore for SqliteProfileStore {
    fn upsert_profile(&self, profile: &MusicProfile) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO music_profile \
             (user_id, top_artists, top_genres, recent_tracks, listening_patterns, last_synced) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(user_id) DO UPDATE SET \
             top_artists = excluded.top_artists, \
             top_genres = excluded.top_genres, \
             recent_tracks = excluded.recent_tracks, \
             listening_patterns = excluded.listening_patterns, \
             last_synced = excluded.last_synced",
            params![
                profile.user_id,
                serde_json::to_string(&profile.top_artists)?,
                serde_json::to_string(&profile.top_genres)?,
                serde_json::to_string(&profile.recent_tracks)?,
                serde_json::to_string(&profile.listening_patterns)?,
                profile.last_synced,
            ],
        )
        .with_context(|| format!("Failed to upsert profile for user {}", profile.user_id))?;
        Ok(())
    }

    fn get_profile(&self, user_id: usize) -> Result<Option<MusicProfile>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT top_artists, top_genres, recent_tracks, listening_patterns, last_synced \
                 FROM music_profile WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((artists, genres, tracks, patterns, last_synced)) => {
                let top_artists: Vec<TopArtist> = serde_json::from_str(&artists)?;
                let top_genres: Vec<TopGenre> = serde_json::from_str(&genres)?;
                let recent_tracks: Vec<RecentTrack> = serde_json::from_str(&tracks)?;
                let listening_patterns: ListeningPatterns = serde_json::from_str(&patterns)?;
                Ok(Some(MusicProfile {
                    user_id,
                    top_artists,
                    top_genres,
                    recent_tracks,
                    listening_patterns,
                    last_synced,
                }))
            }
        }
    }

    fn user_ids_with_profile(&self) -> Result<Vec<usize>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT user_id FROM music_profile ORDER BY user_id ASC")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids.into_iter().map(|id| id as usize).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::extractor::build_music_profile;

    fn open_store() -> (tempfile::TempDir, SqliteProfileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteProfileStore::new(dir.path().join("profiles.db")).unwrap();
        (dir, store)
    }

    fn profile_with_artist(user_id: usize, artist_name: &str) -> MusicProfile {
        build_music_profile(
            user_id,
            vec![TopArtist {
                spotify_id: format!("id-{}", artist_name),
                name: artist_name.to_string(),
                genres: vec!["rock".to_string()],
                image_url: None,
                rank: 1,
            }],
            vec![],
            100,
        )
    }

    #[test]
    fn missing_profile_is_none() {
        let (_dir, store) = open_store();
        assert!(store.get_profile(1).unwrap().is_none());
    }

    #[test]
    fn upsert_replaces_wholesale() {
        let (_dir, store) = open_store();
        store.upsert_profile(&profile_with_artist(1, "First")).unwrap();
        store.upsert_profile(&profile_with_artist(1, "Second")).unwrap();

        let profile = store.get_profile(1).unwrap().unwrap();
        assert_eq!(profile.top_artists.len(), 1);
        assert_eq!(profile.top_artists[0].name, "Second");
    }

    #[test]
    fn lists_users_with_profiles() {
        let (_dir, store) = open_store();
        store.upsert_profile(&profile_with_artist(3, "A")).unwrap();
        store.upsert_profile(&profile_with_artist(1, "B")).unwrap();
        assert_eq!(store.user_ids_with_profile().unwrap(), vec![1, 3]);
    }
}
