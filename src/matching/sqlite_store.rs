use super::models::{Match, ScoreResult, Swipe, SwipeAction};
use super::store::MatchStore;
use crate::sqlite_persistence::{open_versioned, Column, SqlType, Table, VersionedSchema, UNIX_NOW};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

const SWIPE_TABLE: Table = Table {
    name: "swipe",
    columns: &[
        Column::new("id", SqlType::Integer).primary_key(),
        Column::new("user_id", SqlType::Integer).non_null(),
        Column::new("target_user_id", SqlType::Integer).non_null(),
        Column::new("action", SqlType::Text).non_null(),
        Column::new("created", SqlType::Integer).non_null().default(UNIX_NOW),
    ],
    uniques: &[&["user_id", "target_user_id"]],
    indices: &[("idx_swipe_user", "user_id")],
};

// The pair is normalized to user1_id < user2_id before insert, which lets
// the UNIQUE constraint carry the one-shot match-creation guarantee.
const MATCHES_TABLE: Table = Table {
    name: "matches",
    columns: &[
        Column::new("id", SqlType::Integer).primary_key(),
        Column::new("user1_id", SqlType::Integer).non_null(),
        Column::new("user2_id", SqlType::Integer).non_null(),
        Column::new("compatibility_score", SqlType::Integer).non_null(),
        Column::new("breakdown", SqlType::Text).non_null(),
        Column::new("created", SqlType::Integer).non_null().default(UNIX_NOW),
    ],
    uniques: &[&["user1_id", "user2_id"]],
    indices: &[("idx_matches_user1", "user1_id"), ("idx_matches_user2", "user2_id")],
};

const SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[SWIPE_TABLE, MATCHES_TABLE],
    migration: None,
}];

#[derive(Clone)]
pub struct SqliteMatchStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMatchStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(db_path, SCHEMAS).context("Failed to open match store")?;
        Ok(SqliteMatchStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn swipe_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Swipe, String)> {
    let action: String = row.get(3)?;
    Ok((
        Swipe {
            id: row.get::<_, i64>(0)? as usize,
            user_id: row.get::<_, i64>(1)? as usize,
            target_user_id: row.get::<_, i64>(2)? as usize,
            action: SwipeAction::Like, // fixed up by the caller from the raw string
            created_at: row.get(4)?,
        },
        action,
    ))
}

fn decode_swipe(raw: (Swipe, String)) -> Result<Swipe> {
    let (mut swipe, action) = raw;
    swipe.action = SwipeAction::parse(&action)
        .with_context(|| format!("Unknown swipe action in store: {}", action))?;
    Ok(swipe)
}

fn match_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(usize, usize, usize, u8, String, i64)> {
    Ok((
        row.get::<_, i64>(0)? as usize,
        row.get::<_, i64>(1)? as usize,
        row.get::<_, i64>(2)? as usize,
        row.get::<_, i64>(3)? as u8,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_match(raw: (usize, usize, usize, u8, String, i64)) -> Result<Match> {
    let (id, user1_id, user2_id, compatibility_score, breakdown, created_at) = raw;
    Ok(Match {
        id,
        user1_id,
        user2_id,
        compatibility_score,
        breakdown: serde_json::from_str(&breakdown)
            .context("Corrupt breakdown snapshot in match store")?,
        created_at,
    })
}

const MATCH_COLUMNS: &str = "id, user1_id, user2_id, compatibility_score, breakdown, created";

impl MatchStore for SqliteMatchStore {
    fn create_swipe(
        &self,
        user_id: usize,
        target_user_id: usize,
        action: SwipeAction,
    ) -> Result<Option<Swipe>> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO swipe (user_id, target_user_id, action) VALUES (?1, ?2, ?3)",
            params![user_id, target_user_id, action.as_str()],
        )?;
        if inserted == 0 {
            return Ok(None);
        }
        let raw = conn.query_row(
            "SELECT id, user_id, target_user_id, action, created FROM swipe \
             WHERE user_id = ?1 AND target_user_id = ?2",
            params![user_id, target_user_id],
            swipe_from_row,
        )?;
        Ok(Some(decode_swipe(raw)?))
    }

    fn get_swipe(&self, user_id: usize, target_user_id: usize) -> Result<Option<Swipe>> {
        let conn = self.conn.lock().unwrap();
        let raw = conn
            .query_row(
                "SELECT id, user_id, target_user_id, action, created FROM swipe \
                 WHERE user_id = ?1 AND target_user_id = ?2",
                params![user_id, target_user_id],
                swipe_from_row,
            )
            .optional()?;
        raw.map(decode_swipe).transpose()
    }

    fn has_reciprocal_like(&self, user_id: usize, target_user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM swipe \
             WHERE user_id = ?1 AND target_user_id = ?2 AND action = 'like'",
            params![target_user_id, user_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn swiped_target_ids(&self, user_id: usize) -> Result<HashSet<usize>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT target_user_id FROM swipe WHERE user_id = ?1")?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids.into_iter().map(|id| id as usize).collect())
    }

    fn create_match(
        &self,
        user_a: usize,
        user_b: usize,
        breakdown: &ScoreResult,
    ) -> Result<(Match, bool)> {
        if user_a == user_b {
            bail!("A match requires two distinct users");
        }
        let (lo, hi) = (user_a.min(user_b), user_a.max(user_b));
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO matches (user1_id, user2_id, compatibility_score, breakdown) \
             VALUES (?1, ?2, ?3, ?4)",
            params![lo, hi, breakdown.score, serde_json::to_string(breakdown)?],
        )?;
        let raw = conn.query_row(
            &format!(
                "SELECT {} FROM matches WHERE user1_id = ?1 AND user2_id = ?2",
                MATCH_COLUMNS
            ),
            params![lo, hi],
            match_from_row,
        )?;
        Ok((decode_match(raw)?, inserted > 0))
    }

    fn get_match(&self, match_id: usize) -> Result<Option<Match>> {
        let conn = self.conn.lock().unwrap();
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM matches WHERE id = ?1", MATCH_COLUMNS),
                params![match_id],
                match_from_row,
            )
            .optional()?;
        raw.map(decode_match).transpose()
    }

    fn get_match_for_pair(&self, user_a: usize, user_b: usize) -> Result<Option<Match>> {
        let (lo, hi) = (user_a.min(user_b), user_a.max(user_b));
        let conn = self.conn.lock().unwrap();
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM matches WHERE user1_id = ?1 AND user2_id = ?2",
                    MATCH_COLUMNS
                ),
                params![lo, hi],
                match_from_row,
            )
            .optional()?;
        raw.map(decode_match).transpose()
    }

    fn matches_for_user(&self, user_id: usize) -> Result<Vec<Match>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM matches WHERE user1_id = ?1 OR user2_id = ?1 \
             ORDER BY created DESC, id DESC",
            MATCH_COLUMNS
        ))?;
        let raws = stmt
            .query_map(params![user_id], match_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        raws.into_iter().map(decode_match).collect()
    }
}
