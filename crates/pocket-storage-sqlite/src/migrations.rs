//! Database schema migrations

use crate::{Error, Result};
use rusqlite::Connection;

/// Schema version written after all migrations ran
pub const SCHEMA_VERSION: i32 = 2;

/// Run all migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    tracing::debug!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Running migrations"
    );

    if current_version > SCHEMA_VERSION {
        return Err(Error::Migration(format!(
            "database schema {} is newer than supported {}",
            current_version, SCHEMA_VERSION
        )));
    }

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    if current_version < 2 {
        migrate_v2(conn)?;
    }

    if current_version != SCHEMA_VERSION {
        set_schema_version(conn, SCHEMA_VERSION)?;
    }

    Ok(())
}

/// Highest recorded schema version, 0 for a fresh database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result = conn.query_row(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
        [],
        |row| row.get(0),
    );

    match result {
        Ok(v) => Ok(v),
        Err(_) => Ok(0),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
        [],
    )?;
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    tracing::debug!(version, inserted, "Schema version recorded");
    Ok(())
}

/// Record tables
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL DEFAULT '',
            tag INTEGER NOT NULL DEFAULT 0,
            modified_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS photos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL DEFAULT '',
            image BLOB NOT NULL,
            thumbnail BLOB NOT NULL,
            modified_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS credentials (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL DEFAULT '',
            field1 TEXT NOT NULL DEFAULT '',
            field2 TEXT NOT NULL DEFAULT '',
            field3 TEXT NOT NULL DEFAULT '',
            field4 TEXT NOT NULL DEFAULT '',
            lock1 INTEGER NOT NULL DEFAULT 0,
            lock2 INTEGER NOT NULL DEFAULT 0,
            lock3 INTEGER NOT NULL DEFAULT 0,
            lock4 INTEGER NOT NULL DEFAULT 0,
            tag INTEGER NOT NULL DEFAULT 0,
            modified_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notes_modified ON notes(modified_at);
        CREATE INDEX IF NOT EXISTS idx_photos_modified ON photos(modified_at);
        CREATE INDEX IF NOT EXISTS idx_credentials_modified ON credentials(modified_at);
        "#,
    )?;
    Ok(())
}

/// Settings key-value table; `kind` 0 is a plain string, 1 a JSON string array
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            kind INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )?;
    Ok(())
}
