//! SQLite-backed settings
//!
//! Values keep the same string encodings as [`pocket_core::Settings`];
//! string arrays are stored as JSON text.

use crate::database::configure;
use crate::{migrations, Result};
use parking_lot::Mutex;
use pocket_core::SettingsBackend;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const KIND_TEXT: i64 = 0;
const KIND_LIST: i64 = 1;

/// Settings table on its own connection
pub struct SqliteSettingsBackend {
    conn: Mutex<Connection>,
}

impl SqliteSettingsBackend {
    /// Open the settings table in the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        configure(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Settings in a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn read(&self, key: &str, kind: i64) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1 AND kind = ?2",
                params![key, kind],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str, kind: i64) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO settings (key, value, kind) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, kind = excluded.kind
            "#,
            params![key, value, kind],
        )?;
        Ok(())
    }
}

impl SettingsBackend for SqliteSettingsBackend {
    fn get_string(&self, key: &str) -> pocket_core::Result<Option<String>> {
        Ok(self.read(key, KIND_TEXT)?)
    }

    fn set_string(&self, key: &str, value: &str) -> pocket_core::Result<()> {
        Ok(self.write(key, value, KIND_TEXT)?)
    }

    fn get_string_array(&self, key: &str) -> pocket_core::Result<Option<Vec<String>>> {
        match self.read(key, KIND_LIST)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn set_string_array(&self, key: &str, values: &[String]) -> pocket_core::Result<()> {
        let json = serde_json::to_string(values)?;
        Ok(self.write(key, &json, KIND_LIST)?)
    }

    fn remove(&self, key: &str) -> pocket_core::Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM settings WHERE key = ?1", params![key])
            .map_err(crate::Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_core::Settings;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_and_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pocket.sqlite3");

        {
            let settings = Settings::new(Arc::new(SqliteSettingsBackend::open(&path).unwrap()));
            settings.register_defaults().unwrap();
            settings.set_timeout_index(3).unwrap();
            settings.set_default_field_locks([true, false, true, false]).unwrap();
            settings.set_main_passcode("246810").unwrap();
        }

        let settings = Settings::new(Arc::new(SqliteSettingsBackend::open(&path).unwrap()));
        assert_eq!(settings.timeout_seconds(), 90);
        assert_eq!(settings.sort_option(), 1);
        assert!(settings.use_password());
        assert_eq!(settings.default_field_locks(), [true, false, true, false]);
        assert_eq!(settings.main_passcode().unwrap().as_str(), "246810");
    }

    #[test]
    fn test_text_and_list_do_not_alias() {
        let backend = SqliteSettingsBackend::open_in_memory().unwrap();
        backend.set_string("k", "v").unwrap();
        assert_eq!(backend.get_string_array("k").unwrap(), None);

        backend.set_string_array("k", &["a".to_string()]).unwrap();
        assert_eq!(backend.get_string("k").unwrap(), None);
        assert_eq!(backend.get_string_array("k").unwrap(), Some(vec!["a".to_string()]));

        backend.remove("k").unwrap();
        assert_eq!(backend.get_string_array("k").unwrap(), None);
    }
}
