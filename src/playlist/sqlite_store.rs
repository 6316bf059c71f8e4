use super::models::{
    MemberRole, PlaylistKind, PlaylistMember, PlaylistTrack, RecapTrack, SharedPlaylist,
    WeeklyRecap,
};
use super::recap::RecapData;
use super::store::{NewPlaylist, PlaylistStore};
use crate::sqlite_persistence::{open_versioned, Column, SqlType, Table, VersionedSchema, UNIX_NOW};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

// match_id is in a UNIQUE set: SQLite treats NULLs as distinct there, so
// group playlists coexist while a second playlist for the same match is
// rejected at insert.
const PLAYLIST_TABLE: Table = Table {
    name: "shared_playlist",
    columns: &[
        Column::new("id", SqlType::Text).primary_key(),
        Column::new("match_id", SqlType::Integer),
        Column::new("name", SqlType::Text).non_null(),
        Column::new("description", SqlType::Text),
        Column::new("kind", SqlType::Text).non_null(),
        Column::new("created_by", SqlType::Integer).non_null(),
        Column::new("is_active", SqlType::Integer).non_null().default("1"),
        Column::new("created", SqlType::Integer).non_null().default(UNIX_NOW),
        Column::new("updated", SqlType::Integer).non_null().default(UNIX_NOW),
    ],
    uniques: &[&["match_id"]],
    indices: &[],
};

const PLAYLIST_TRACK_TABLE: Table = Table {
    name: "playlist_track",
    columns: &[
        Column::new("id", SqlType::Integer).primary_key(),
        Column::new("playlist_id", SqlType::Text).non_null(),
        Column::new("spotify_id", SqlType::Text).non_null(),
        Column::new("track_name", SqlType::Text).non_null(),
        Column::new("artist", SqlType::Text).non_null(),
        Column::new("album", SqlType::Text).non_null(),
        Column::new("image_url", SqlType::Text),
        Column::new("spotify_url", SqlType::Text),
        Column::new("added_by", SqlType::Integer).non_null(),
        Column::new("added_at", SqlType::Integer).non_null(),
    ],
    uniques: &[&["playlist_id", "spotify_id"]],
    indices: &[("idx_playlist_track_playlist", "playlist_id")],
};

const PLAYLIST_MEMBER_TABLE: Table = Table {
    name: "playlist_member",
    columns: &[
        Column::new("playlist_id", SqlType::Text).non_null(),
        Column::new("user_id", SqlType::Integer).non_null(),
        Column::new("role", SqlType::Text).non_null(),
        Column::new("joined", SqlType::Integer).non_null().default(UNIX_NOW),
    ],
    uniques: &[&["playlist_id", "user_id"]],
    indices: &[("idx_playlist_member_user", "user_id")],
};

const WEEKLY_RECAP_TABLE: Table = Table {
    name: "weekly_recap",
    columns: &[
        Column::new("id", SqlType::Integer).primary_key(),
        Column::new("playlist_id", SqlType::Text).non_null(),
        Column::new("week_start", SqlType::Text).non_null(),
        Column::new("tracks_added", SqlType::Integer).non_null(),
        Column::new("top_contributor", SqlType::Integer),
        Column::new("total_tracks", SqlType::Integer).non_null(),
        Column::new("week_tracks", SqlType::Text).non_null(),
        Column::new("created", SqlType::Integer).non_null().default(UNIX_NOW),
    ],
    uniques: &[&["playlist_id", "week_start"]],
    indices: &[],
};

const SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        PLAYLIST_TABLE,
        PLAYLIST_TRACK_TABLE,
        PLAYLIST_MEMBER_TABLE,
        WEEKLY_RECAP_TABLE,
    ],
    migration: None,
}];

#[derive(Clone)]
pub struct SqlitePlaylistStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlaylistStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(db_path, SCHEMAS).context("Failed to open playlist store")?;
        Ok(SqlitePlaylistStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn load_tracks(conn: &Connection, playlist_id: &str) -> Result<Vec<PlaylistTrack>> {
        let mut stmt = conn.prepare(
            "SELECT spotify_id, track_name, artist, album, image_url, spotify_url, added_by, added_at \
             FROM playlist_track WHERE playlist_id = ?1 ORDER BY id ASC",
        )?;
        let tracks = stmt
            .query_map(params![playlist_id], |row| {
                Ok(PlaylistTrack {
                    spotify_id: row.get(0)?,
                    track_name: row.get(1)?,
                    artist: row.get(2)?,
                    album: row.get(3)?,
                    image_url: row.get(4)?,
                    spotify_url: row.get(5)?,
                    added_by: row.get::<_, i64>(6)? as usize,
                    added_at: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tracks)
    }

    fn load_playlist_row(conn: &Connection, playlist_id: &str) -> Result<Option<SharedPlaylist>> {
        let row = conn
            .query_row(
                "SELECT id, match_id, name, description, kind, created_by, is_active, created, updated \
                 FROM shared_playlist WHERE id = ?1 AND is_active = 1",
                params![playlist_id],
                playlist_meta_from_row,
            )
            .optional()?;
        match row {
            None => Ok(None),
            Some(meta) => {
                let tracks = Self::load_tracks(conn, playlist_id)?;
                Ok(Some(assemble(meta, tracks)?))
            }
        }
    }

    fn touch(conn: &Connection, playlist_id: &str) -> Result<()> {
        conn.execute(
            "UPDATE shared_playlist SET updated = cast(strftime('%s','now') as int) WHERE id = ?1",
            params![playlist_id],
        )?;
        Ok(())
    }
}

type PlaylistMetaRow = (
    String,
    Option<i64>,
    String,
    Option<String>,
    String,
    i64,
    i64,
    i64,
    i64,
);

fn playlist_meta_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlaylistMetaRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn assemble(meta: PlaylistMetaRow, tracks: Vec<PlaylistTrack>) -> Result<SharedPlaylist> {
    let (id, match_id, name, description, kind, created_by, is_active, created, updated) = meta;
    Ok(SharedPlaylist {
        id,
        match_id: match_id.map(|m| m as usize),
        name,
        description,
        kind: PlaylistKind::parse(&kind)
            .with_context(|| format!("Unknown playlist kind in store: {}", kind))?,
        created_by: created_by as usize,
        tracks,
        is_active: is_active != 0,
        created_at: created,
        updated_at: updated,
    })
}

impl PlaylistStore for SqlitePlaylistStore {
    fn create_playlist(&self, playlist: &NewPlaylist) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO shared_playlist (id, match_id, name, description, kind, created_by) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                playlist.id,
                playlist.match_id,
                playlist.name,
                playlist.description,
                playlist.kind.as_str(),
                playlist.created_by
            ],
        )
        .with_context(|| format!("Failed to create playlist {}", playlist.id))?;
        Ok(())
    }

    fn get_playlist(&self, playlist_id: &str) -> Result<Option<SharedPlaylist>> {
        let conn = self.conn.lock().unwrap();
        Self::load_playlist_row(&conn, playlist_id)
    }

    fn get_playlist_by_match(&self, match_id: usize) -> Result<Option<SharedPlaylist>> {
        let conn = self.conn.lock().unwrap();
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM shared_playlist WHERE match_id = ?1 AND is_active = 1",
                params![match_id],
                |row| row.get(0),
            )
            .optional()?;
        match id {
            None => Ok(None),
            Some(id) => Self::load_playlist_row(&conn, &id),
        }
    }

    fn playlists_for_user(&self, user_id: usize) -> Result<Vec<SharedPlaylist>> {
        let conn = self.conn.lock().unwrap();
        let ids: Vec<String> = {
            let mut stmt = conn.prepare(
                "SELECT p.id FROM shared_playlist p \
                 JOIN playlist_member m ON m.playlist_id = p.id \
                 WHERE m.user_id = ?1 AND p.is_active = 1 \
                 ORDER BY p.updated DESC, p.id ASC",
            )?;
            let x = stmt
                .query_map(params![user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            x
        };
        let mut playlists = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(playlist) = Self::load_playlist_row(&conn, &id)? {
                playlists.push(playlist);
            }
        }
        Ok(playlists)
    }

    fn soft_delete_playlist(&self, playlist_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE shared_playlist SET is_active = 0 WHERE id = ?1 AND is_active = 1",
            params![playlist_id],
        )?;
        Ok(updated > 0)
    }

    fn add_track(&self, playlist_id: &str, track: &PlaylistTrack) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO playlist_track \
             (playlist_id, spotify_id, track_name, artist, album, image_url, spotify_url, added_by, added_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                playlist_id,
                track.spotify_id,
                track.track_name,
                track.artist,
                track.album,
                track.image_url,
                track.spotify_url,
                track.added_by,
                track.added_at
            ],
        )?;
        if inserted > 0 {
            Self::touch(&conn, playlist_id)?;
        }
        Ok(inserted > 0)
    }

    fn remove_track(&self, playlist_id: &str, spotify_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM playlist_track WHERE playlist_id = ?1 AND spotify_id = ?2",
            params![playlist_id, spotify_id],
        )?;
        if removed > 0 {
            Self::touch(&conn, playlist_id)?;
        }
        Ok(removed > 0)
    }

    fn add_member(&self, playlist_id: &str, user_id: usize, role: MemberRole) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO playlist_member (playlist_id, user_id, role) VALUES (?1, ?2, ?3)",
            params![playlist_id, user_id, role.as_str()],
        )?;
        Ok(inserted > 0)
    }

    fn remove_member(&self, playlist_id: &str, user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM playlist_member WHERE playlist_id = ?1 AND user_id = ?2",
            params![playlist_id, user_id],
        )?;
        Ok(removed > 0)
    }

    fn get_member(&self, playlist_id: &str, user_id: usize) -> Result<Option<PlaylistMember>> {
        let conn = self.conn.lock().unwrap();
        let member = conn
            .query_row(
                "SELECT playlist_id, user_id, role, joined FROM playlist_member \
                 WHERE playlist_id = ?1 AND user_id = ?2",
                params![playlist_id, user_id],
                member_from_row,
            )
            .optional()?;
        member.map(decode_member).transpose()
    }

    fn get_members(&self, playlist_id: &str) -> Result<Vec<PlaylistMember>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT playlist_id, user_id, role, joined FROM playlist_member \
             WHERE playlist_id = ?1 ORDER BY joined ASC, user_id ASC",
        )?;
        let raws = stmt
            .query_map(params![playlist_id], member_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        raws.into_iter().map(decode_member).collect()
    }

    fn get_recap(&self, playlist_id: &str, week_start: NaiveDate) -> Result<Option<WeeklyRecap>> {
        let conn = self.conn.lock().unwrap();
        let raw = conn
            .query_row(
                "SELECT id, playlist_id, week_start, tracks_added, top_contributor, total_tracks, week_tracks, created \
                 FROM weekly_recap WHERE playlist_id = ?1 AND week_start = ?2",
                params![playlist_id, week_start.to_string()],
                recap_from_row,
            )
            .optional()?;
        raw.map(decode_recap).transpose()
    }

    fn insert_recap(
        &self,
        playlist_id: &str,
        week_start: NaiveDate,
        data: &RecapData,
    ) -> Result<WeeklyRecap> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO weekly_recap \
             (playlist_id, week_start, tracks_added, top_contributor, total_tracks, week_tracks) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                playlist_id,
                week_start.to_string(),
                data.tracks_added,
                data.top_contributor,
                data.total_tracks,
                serde_json::to_string(&data.week_tracks)?
            ],
        )?;
        let raw = conn.query_row(
            "SELECT id, playlist_id, week_start, tracks_added, top_contributor, total_tracks, week_tracks, created \
             FROM weekly_recap WHERE playlist_id = ?1 AND week_start = ?2",
            params![playlist_id, week_start.to_string()],
            recap_from_row,
        )?;
        decode_recap(raw)
    }
}

fn member_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, i64, String, i64)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_member(raw: (String, i64, String, i64)) -> Result<PlaylistMember> {
    let (playlist_id, user_id, role, joined) = raw;
    Ok(PlaylistMember {
        playlist_id,
        user_id: user_id as usize,
        role: MemberRole::parse(&role)
            .with_context(|| format!("Unknown member role in store: {}", role))?,
        joined_at: joined,
    })
}

type RecapRow = (i64, String, String, i64, Option<i64>, i64, String, i64);

fn recap_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecapRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn decode_recap(raw: RecapRow) -> Result<WeeklyRecap> {
    let (id, playlist_id, week_start, tracks_added, top_contributor, total_tracks, week_tracks, created) =
        raw;
    let week_tracks: Vec<RecapTrack> = serde_json::from_str(&week_tracks)?;
    Ok(WeeklyRecap {
        id: id as usize,
        playlist_id,
        week_start: week_start
            .parse()
            .with_context(|| format!("Corrupt week_start in recap store: {}", week_start))?,
        tracks_added: tracks_added as usize,
        top_contributor: top_contributor.map(|c| c as usize),
        total_tracks: total_tracks as usize,
        week_tracks,
        created_at: created,
    })
}
