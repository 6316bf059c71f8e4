use super::auth::{AuthToken, AuthTokenValue};
use super::models::{NewUser, User};
use super::store::UserStore;
use crate::sqlite_persistence::{open_versioned, Column, SqlType, Table, VersionedSchema, UNIX_NOW};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

const USER_TABLE: Table = Table {
    name: "user",
    columns: &[
        Column::new("id", SqlType::Integer).primary_key(),
        Column::new("email", SqlType::Text).non_null(),
        Column::new("display_name", SqlType::Text).non_null(),
        Column::new("student_id", SqlType::Text),
        Column::new("course", SqlType::Text),
        Column::new("year", SqlType::Integer),
        Column::new("faculty", SqlType::Text),
        Column::new("show_course", SqlType::Integer).non_null().default("1"),
        Column::new("show_year", SqlType::Integer).non_null().default("1"),
        Column::new("show_faculty", SqlType::Integer).non_null().default("1"),
        Column::new("created", SqlType::Integer).non_null().default(UNIX_NOW),
    ],
    uniques: &[&["email"]],
    indices: &[("idx_user_email", "email")],
};

const AUTH_TOKEN_TABLE: Table = Table {
    name: "auth_token",
    columns: &[
        Column::new("user_id", SqlType::Integer).non_null(),
        Column::new("value", SqlType::Text).non_null(),
        Column::new("created", SqlType::Integer).non_null().default(UNIX_NOW),
        Column::new("last_used", SqlType::Integer),
    ],
    uniques: &[&["value"]],
    indices: &[("idx_auth_token_value", "value")],
};

const SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[USER_TABLE, AUTH_TOKEN_TABLE],
    migration: None,
}];

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(db_path, SCHEMAS).context("Failed to open user store")?;
        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get::<_, i64>(0)? as usize,
        email: row.get(1)?,
        display_name: row.get(2)?,
        student_id: row.get(3)?,
        course: row.get(4)?,
        year: row.get::<_, Option<i64>>(5)?.map(|y| y as u32),
        faculty: row.get(6)?,
        show_course: row.get::<_, i64>(7)? != 0,
        show_year: row.get::<_, i64>(8)? != 0,
        show_faculty: row.get::<_, i64>(9)? != 0,
        created: row.get(10)?,
    })
}

const USER_COLUMNS: &str =
    "id, email, display_name, student_id, course, year, faculty, show_course, show_year, show_faculty, created";

impl UserStore for SqliteUserStore {
    fn create_user(&self, new_user: &NewUser) -> Result<usize> {
        if new_user.email.is_empty() {
            bail!("The email cannot be empty.");
        }
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user (email, display_name, student_id, course, year, faculty) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new_user.email,
                new_user.display_name,
                new_user.student_id,
                new_user.course,
                new_user.year,
                new_user.faculty
            ],
        )
        .with_context(|| format!("Failed to create user {}", new_user.email))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM user WHERE id = ?1", USER_COLUMNS),
                params![user_id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM user WHERE email = ?1", USER_COLUMNS),
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn all_user_ids(&self) -> Result<Vec<usize>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM user ORDER BY id ASC")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids.into_iter().map(|id| id as usize).collect())
    }

    fn set_privacy_flags(
        &self,
        user_id: usize,
        show_course: bool,
        show_year: bool,
        show_faculty: bool,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE user SET show_course = ?2, show_year = ?3, show_faculty = ?4 WHERE id = ?1",
            params![user_id, show_course, show_year, show_faculty],
        )?;
        if updated == 0 {
            bail!("User {} does not exist", user_id);
        }
        Ok(())
    }

    fn add_auth_token(&self, token: AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO auth_token (user_id, value, created, last_used) VALUES (?1, ?2, ?3, ?4)",
            params![token.user_id, token.value.0, token.created, token.last_used],
        )?;
        Ok(())
    }

    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let token = conn
            .query_row(
                "SELECT user_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![value.0],
                |row| {
                    Ok(AuthToken {
                        user_id: row.get::<_, i64>(0)? as usize,
                        value: AuthTokenValue(row.get(1)?),
                        created: row.get(2)?,
                        last_used: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(token)
    }

    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM auth_token WHERE value = ?1", params![value.0])?;
        Ok(())
    }

    fn touch_auth_token(&self, value: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE auth_token SET last_used = cast(strftime('%s','now') as int) WHERE value = ?1",
            params![value.0],
        )?;
        Ok(())
    }
}
