//! Versioned SQLite schema machinery shared by all stores.
//!
//! Each store declares its tables as consts, one set per schema version.
//! Opening a database creates the latest schema on a fresh file, or
//! validates the on-disk shape and runs pending migrations on an existing
//! one. The current version lives in `PRAGMA user_version`.

use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub primary_key: bool,
    pub non_null: bool,
    pub default_value: Option<&'static str>,
}

/// Default expression for unix-seconds creation timestamps.
pub const UNIX_NOW: &str = "(cast(strftime('%s','now') as int))";

impl Column {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Column {
            name,
            sql_type,
            primary_key: false,
            non_null: false,
            default_value: None,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    pub const fn default(mut self, expr: &'static str) -> Self {
        self.default_value = Some(expr);
        self
    }
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Column sets with a UNIQUE constraint.
    pub uniques: &'static [&'static [&'static str]],
    /// (index name, indexed columns) pairs.
    pub indices: &'static [(&'static str, &'static str)],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut sql = format!("CREATE TABLE {} (", self.name);
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column.name);
            sql.push(' ');
            sql.push_str(column.sql_type.as_sql());
            if column.primary_key {
                sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                sql.push_str(" NOT NULL");
            }
            if let Some(default_value) = column.default_value {
                sql.push_str(&format!(" DEFAULT {}", default_value));
            }
        }
        for unique in self.uniques {
            sql.push_str(&format!(", UNIQUE ({})", unique.join(", ")));
        }
        sql.push_str(");");
        conn.execute(&sql, [])
            .with_context(|| format!("Failed to create table {}", self.name))?;

        for (index_name, columns) in self.indices {
            conn.execute(
                &format!("CREATE INDEX {} ON {}({});", index_name, self.name, columns),
                [],
            )?;
        }
        Ok(())
    }

    /// Checks that the on-disk table has exactly the declared columns,
    /// in order, with matching types. Constraint shapes are trusted to the
    /// migration path.
    fn validate(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<std::result::Result<_, _>>()?;

        if actual.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {} ({})",
                self.name,
                actual.len(),
                self.columns.len(),
                self.columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        for ((actual_name, actual_type), expected) in actual.iter().zip(self.columns.iter()) {
            if actual_name != expected.name {
                bail!(
                    "Table {} column mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    actual_name
                );
            }
            if actual_type != expected.sql_type.as_sql() {
                bail!(
                    "Table {} column {} type mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.sql_type.as_sql(),
                    actual_type
                );
            }
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(&format!("PRAGMA user_version = {}", self.version), [])?;
        Ok(())
    }
}

/// Opens (or creates) a store database and brings it to the latest schema
/// version in `schemas`, which must be ordered by version ascending.
pub fn open_versioned<P: AsRef<Path>>(
    db_path: P,
    schemas: &[VersionedSchema],
) -> Result<Connection> {
    let latest = schemas.last().context("No schema versions declared")?;

    if !db_path.as_ref().exists() {
        let conn = Connection::open(db_path)?;
        latest.create(&conn)?;
        return Ok(conn);
    }

    let conn = Connection::open_with_flags(
        db_path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    let version = conn
        .query_row("PRAGMA user_version;", [], |row| row.get::<_, i64>(0))
        .context("Failed to read database version")? as usize;

    if version > latest.version {
        bail!(
            "Database version {} is newer than supported version {}",
            version,
            latest.version
        );
    }

    let current = schemas
        .iter()
        .find(|s| s.version == version)
        .with_context(|| format!("No schema declared for database version {}", version))?;
    for table in current.tables {
        table.validate(&conn)?;
    }

    for schema in schemas.iter().filter(|s| s.version > version) {
        if let Some(migrate) = schema.migration {
            tracing::info!("Migrating db to version {}", schema.version);
            migrate(&conn)?;
        }
        conn.execute(&format!("PRAGMA user_version = {}", schema.version), [])?;
    }

    Ok(conn)
}
