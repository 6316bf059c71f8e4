use super::models::{Message, MessageKind, SongData};
use super::store::MessageStore;
use crate::sqlite_persistence::{open_versioned, Column, SqlType, Table, VersionedSchema, UNIX_NOW};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

const MESSAGE_TABLE: Table = Table {
    name: "message",
    columns: &[
        Column::new("id", SqlType::Integer).primary_key(),
        Column::new("match_id", SqlType::Integer).non_null(),
        Column::new("sender_id", SqlType::Integer).non_null(),
        Column::new("content", SqlType::Text).non_null(),
        Column::new("kind", SqlType::Text).non_null(),
        Column::new("song_data", SqlType::Text),
        Column::new("is_read", SqlType::Integer).non_null().default("0"),
        Column::new("created", SqlType::Integer).non_null().default(UNIX_NOW),
    ],
    uniques: &[],
    indices: &[("idx_message_match", "match_id")],
};

const SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[MESSAGE_TABLE],
    migration: None,
}];

#[derive(Clone)]
pub struct SqliteMessageStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMessageStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(db_path, SCHEMAS).context("Failed to open message store")?;
        Ok(SqliteMessageStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

type MessageRow = (i64, i64, i64, String, String, Option<String>, i64, i64);

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
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

fn decode_message(raw: MessageRow) -> Result<Message> {
    let (id, match_id, sender_id, content, kind, song_data, is_read, created) = raw;
    Ok(Message {
        id: id as usize,
        match_id: match_id as usize,
        sender_id: sender_id as usize,
        content,
        kind: MessageKind::parse(&kind)
            .with_context(|| format!("Unknown message kind in store: {}", kind))?,
        song_data: song_data
            .map(|s| serde_json::from_str::<SongData>(&s))
            .transpose()
            .context("Corrupt song payload in message store")?,
        is_read: is_read != 0,
        created_at: created,
    })
}

impl MessageStore for SqliteMessageStore {
    fn create_message(
        &self,
        match_id: usize,
        sender_id: usize,
        content: &str,
        kind: MessageKind,
        song_data: Option<&SongData>,
    ) -> Result<Message> {
        let conn = self.conn.lock().unwrap();
        let song_json = song_data.map(serde_json::to_string).transpose()?;
        conn.execute(
            "INSERT INTO message (match_id, sender_id, content, kind, song_data) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![match_id, sender_id, content, kind.as_str(), song_json],
        )?;
        let id = conn.last_insert_rowid();
        let raw = conn.query_row(
            "SELECT id, match_id, sender_id, content, kind, song_data, is_read, created \
             FROM message WHERE id = ?1",
            params![id],
            message_from_row,
        )?;
        decode_message(raw)
    }

    fn messages_for_match(
        &self,
        match_id: usize,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, match_id, sender_id, content, kind, song_data, is_read, created \
             FROM message WHERE match_id = ?1 ORDER BY created ASC, id ASC LIMIT ?2 OFFSET ?3",
        )?;
        let raws = stmt
            .query_map(params![match_id, limit, offset], message_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        raws.into_iter().map(decode_message).collect()
    }

    fn mark_read(&self, match_id: usize, reader_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE message SET is_read = 1 \
             WHERE match_id = ?1 AND sender_id != ?2 AND is_read = 0",
            params![match_id, reader_id],
        )?;
        Ok(updated)
    }

    fn unread_counts(&self, user_id: usize, match_ids: &[usize]) -> Result<HashMap<usize, usize>> {
        let mut counts = HashMap::new();
        if match_ids.is_empty() {
            return Ok(counts);
        }
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT COUNT(*) FROM message \
             WHERE match_id = ?1 AND sender_id != ?2 AND is_read = 0",
        )?;
        for &match_id in match_ids {
            let count: i64 = stmt.query_row(params![match_id, user_id], |row| row.get(0))?;
            if count > 0 {
                counts.insert(match_id, count as usize);
            }
        }
        Ok(counts)
    }
}
