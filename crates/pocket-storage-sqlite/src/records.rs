//! Record tables
//!
//! Each record kind lives in its own table behind a stateless
//! [`RecordTable`] implementation. Drafts are inserted once; after that a
//! save compares the draft against the stored row and writes only the
//! columns that differ, skipping the write entirely when nothing changed.

use crate::error::{Error, Result};
use crate::models::{Credential, CredentialField, Note, Photo, Record, SortOrder};
use chrono::{DateTime, Utc};
use pocket_core::TagColor;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

/// Changed column and its new value
pub type ColumnChange = (&'static str, Value);

fn to_millis(at: &DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

// Unreadable timestamps fall back to the epoch instead of failing the fetch.
fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn tag_from_column(value: i64) -> TagColor {
    u8::try_from(value).map(TagColor::from_u8).unwrap_or_default()
}

fn push_text(changes: &mut Vec<ColumnChange>, column: &'static str, stored: &str, draft: &str) {
    if stored != draft {
        changes.push((column, Value::Text(draft.to_string())));
    }
}

fn push_int(changes: &mut Vec<ColumnChange>, column: &'static str, stored: i64, draft: i64) {
    if stored != draft {
        changes.push((column, Value::Integer(draft)));
    }
}

fn push_blob(changes: &mut Vec<ColumnChange>, column: &'static str, stored: &[u8], draft: &[u8]) {
    if stored != draft {
        changes.push((column, Value::Blob(draft.to_vec())));
    }
}

/// Storage contract shared by the three record kinds
pub trait RecordTable {
    /// Record type stored in the table
    type Record: Record + Clone;

    /// Table name
    const TABLE: &'static str;

    /// Column list matching [`RecordTable::row_to_record`]
    const COLUMNS: &'static str;

    /// Build a record from a row selected with [`RecordTable::COLUMNS`]
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Self::Record>;

    /// Insert every column of a draft, returning the new row id
    fn insert_row(conn: &Connection, record: &Self::Record) -> Result<i64>;

    /// Columns whose draft value differs from the stored one
    fn changed_columns(stored: &Self::Record, draft: &Self::Record) -> Vec<ColumnChange>;

    /// All records in `sort` order
    fn fetch(conn: &Connection, sort: SortOrder) -> Result<Vec<Self::Record>> {
        Self::fetch_page(conn, sort, 0, None)
    }

    /// One page of records in `sort` order
    fn fetch_page(
        conn: &Connection,
        sort: SortOrder,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Self::Record>> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} LIMIT ?1 OFFSET ?2",
            Self::COLUMNS,
            Self::TABLE,
            sort.order_by()
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![limit, offset as i64], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Record by row id
    fn get(conn: &Connection, id: i64) -> Result<Option<Self::Record>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", Self::COLUMNS, Self::TABLE);
        let record = conn
            .query_row(&sql, params![id], Self::row_to_record)
            .optional()?;
        Ok(record)
    }

    /// Insert a draft and attach its row id
    fn insert(conn: &Connection, record: &mut Self::Record) -> Result<i64> {
        if let Some(id) = record.id() {
            return Err(Error::Validation(format!(
                "{} row {} is already stored",
                Self::TABLE,
                id
            )));
        }
        let id = Self::insert_row(conn, record)?;
        record.set_id(id);
        tracing::debug!(table = Self::TABLE, id, "Record inserted");
        Ok(id)
    }

    /// Write only the columns that changed; `false` means nothing was written
    fn update_changed(conn: &Connection, record: &Self::Record) -> Result<bool> {
        let id = record
            .id()
            .ok_or_else(|| Error::Validation(format!("{} draft has no row id", Self::TABLE)))?;
        let stored = Self::get(conn, id)?
            .ok_or_else(|| Error::NotFound(format!("{} row {}", Self::TABLE, id)))?;

        let changes = Self::changed_columns(&stored, record);
        if changes.is_empty() {
            return Ok(false);
        }

        let assignments: Vec<String> = changes
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            Self::TABLE,
            assignments.join(", "),
            changes.len() + 1
        );
        let columns: Vec<&str> = changes.iter().map(|(c, _)| *c).collect();
        let values = changes
            .into_iter()
            .map(|(_, value)| value)
            .chain(std::iter::once(Value::Integer(id)));
        conn.execute(&sql, params_from_iter(values))?;

        tracing::debug!(table = Self::TABLE, id, ?columns, "Record updated");
        Ok(true)
    }

    /// Insert a draft or update a stored record; `false` means no write happened
    fn save(conn: &Connection, record: &mut Self::Record) -> Result<bool> {
        if record.is_draft() {
            Self::insert(conn, record)?;
            Ok(true)
        } else {
            Self::update_changed(conn, record)
        }
    }

    /// Delete by row id; `false` when the row did not exist
    fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", Self::TABLE);
        let rows = conn.execute(&sql, params![id])?;
        tracing::debug!(table = Self::TABLE, id, rows, "Record deleted");
        Ok(rows > 0)
    }

    /// Delete several rows by id
    fn delete_ids(conn: &Connection, ids: &[i64]) -> Result<usize> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", Self::TABLE);
        let mut stmt = conn.prepare(&sql)?;
        let mut removed = 0;
        for id in ids {
            removed += stmt.execute(params![id])?;
        }
        Ok(removed)
    }

    /// Delete every record of this kind
    fn delete_all(conn: &Connection) -> Result<usize> {
        let sql = format!("DELETE FROM {}", Self::TABLE);
        let rows = conn.execute(&sql, [])?;
        tracing::info!(table = Self::TABLE, rows, "All records deleted");
        Ok(rows)
    }

    /// Number of stored records
    fn count(conn: &Connection) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::TABLE);
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

/// Notes table
pub struct NoteTable;

impl RecordTable for NoteTable {
    type Record = Note;
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static str = "id, title, body, tag, modified_at";

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Note> {
        Ok(Note {
            id: Some(row.get(0)?),
            title: row.get(1)?,
            body: row.get(2)?,
            tag: tag_from_column(row.get(3)?),
            modified_at: from_millis(row.get(4)?),
        })
    }

    fn insert_row(conn: &Connection, note: &Note) -> Result<i64> {
        conn.execute(
            "INSERT INTO notes (title, body, tag, modified_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                note.title,
                note.body,
                note.tag.as_u8() as i64,
                to_millis(&note.modified_at)
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn changed_columns(stored: &Note, draft: &Note) -> Vec<ColumnChange> {
        let mut changes = Vec::new();
        push_text(&mut changes, "title", &stored.title, &draft.title);
        push_text(&mut changes, "body", &stored.body, &draft.body);
        push_int(&mut changes, "tag", stored.tag.as_u8() as i64, draft.tag.as_u8() as i64);
        push_int(
            &mut changes,
            "modified_at",
            to_millis(&stored.modified_at),
            to_millis(&draft.modified_at),
        );
        changes
    }
}

/// Photos table
pub struct PhotoTable;

impl RecordTable for PhotoTable {
    type Record = Photo;
    const TABLE: &'static str = "photos";
    const COLUMNS: &'static str = "id, title, image, thumbnail, modified_at";

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Photo> {
        Ok(Photo {
            id: Some(row.get(0)?),
            title: row.get(1)?,
            image: row.get(2)?,
            thumbnail: row.get(3)?,
            modified_at: from_millis(row.get(4)?),
        })
    }

    fn insert_row(conn: &Connection, photo: &Photo) -> Result<i64> {
        conn.execute(
            "INSERT INTO photos (title, image, thumbnail, modified_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                photo.title,
                photo.image,
                photo.thumbnail,
                to_millis(&photo.modified_at)
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn changed_columns(stored: &Photo, draft: &Photo) -> Vec<ColumnChange> {
        let mut changes = Vec::new();
        push_text(&mut changes, "title", &stored.title, &draft.title);
        push_blob(&mut changes, "image", &stored.image, &draft.image);
        push_blob(&mut changes, "thumbnail", &stored.thumbnail, &draft.thumbnail);
        push_int(
            &mut changes,
            "modified_at",
            to_millis(&stored.modified_at),
            to_millis(&draft.modified_at),
        );
        changes
    }
}

/// Credentials table
pub struct CredentialTable;

const FIELD_COLUMNS: [&str; 4] = ["field1", "field2", "field3", "field4"];
const LOCK_COLUMNS: [&str; 4] = ["lock1", "lock2", "lock3", "lock4"];

impl RecordTable for CredentialTable {
    type Record = Credential;
    const TABLE: &'static str = "credentials";
    const COLUMNS: &'static str =
        "id, title, field1, field2, field3, field4, lock1, lock2, lock3, lock4, tag, modified_at";

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Credential> {
        let mut fields: [CredentialField; 4] = Default::default();
        for (i, field) in fields.iter_mut().enumerate() {
            field.value = row.get(2 + i)?;
            field.locked = row.get::<_, i64>(6 + i)? != 0;
        }
        Ok(Credential {
            id: Some(row.get(0)?),
            title: row.get(1)?,
            fields,
            tag: tag_from_column(row.get(10)?),
            modified_at: from_millis(row.get(11)?),
        })
    }

    fn insert_row(conn: &Connection, credential: &Credential) -> Result<i64> {
        let [f1, f2, f3, f4] = &credential.fields;
        conn.execute(
            r#"
            INSERT INTO credentials
                (title, field1, field2, field3, field4,
                 lock1, lock2, lock3, lock4, tag, modified_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                credential.title,
                f1.value,
                f2.value,
                f3.value,
                f4.value,
                f1.locked as i64,
                f2.locked as i64,
                f3.locked as i64,
                f4.locked as i64,
                credential.tag.as_u8() as i64,
                to_millis(&credential.modified_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn changed_columns(stored: &Credential, draft: &Credential) -> Vec<ColumnChange> {
        let mut changes = Vec::new();
        push_text(&mut changes, "title", &stored.title, &draft.title);
        for (i, (old, new)) in stored.fields.iter().zip(draft.fields.iter()).enumerate() {
            push_text(&mut changes, FIELD_COLUMNS[i], &old.value, &new.value);
            push_int(&mut changes, LOCK_COLUMNS[i], old.locked as i64, new.locked as i64);
        }
        push_int(&mut changes, "tag", stored.tag.as_u8() as i64, draft.tag.as_u8() as i64);
        push_int(
            &mut changes,
            "modified_at",
            to_millis(&stored.modified_at),
            to_millis(&draft.modified_at),
        );
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn note(title: &str, secs: i64) -> Note {
        Note {
            title: title.to_string(),
            body: format!("{} body", title),
            ..Note::draft(at(secs))
        }
    }

    #[test]
    fn test_insert_attaches_id_once() {
        let db = Database::open_in_memory().unwrap();
        let mut n = note("a", 0);

        let id = NoteTable::insert(db.conn(), &mut n).unwrap();
        assert_eq!(n.id, Some(id));
        assert!(matches!(
            NoteTable::insert(db.conn(), &mut n),
            Err(Error::Validation(_))
        ));
        assert_eq!(NoteTable::count(db.conn()).unwrap(), 1);
    }

    #[test]
    fn test_fetch_orders() {
        let db = Database::open_in_memory().unwrap();
        for (title, secs) in [("b", 10), ("c", 0), ("a", 20)] {
            NoteTable::insert(db.conn(), &mut note(title, secs)).unwrap();
        }

        let titles = |sort| -> Vec<String> {
            NoteTable::fetch(db.conn(), sort)
                .unwrap()
                .into_iter()
                .map(|n| n.title)
                .collect()
        };
        assert_eq!(titles(SortOrder::DateAscending), ["c", "b", "a"]);
        assert_eq!(titles(SortOrder::DateDescending), ["a", "b", "c"]);
        assert_eq!(titles(SortOrder::TitleAscending), ["a", "b", "c"]);

        let page = NoteTable::fetch_page(db.conn(), SortOrder::DateAscending, 1, Some(1)).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "b");
    }

    #[test]
    fn test_changed_columns_only_lists_differences() {
        let stored = note("same", 0);
        let mut draft = stored.clone();
        assert!(NoteTable::changed_columns(&stored, &draft).is_empty());

        draft.body = "new body".to_string();
        draft.tag = TagColor::Blue;
        let columns: Vec<&str> = NoteTable::changed_columns(&stored, &draft)
            .into_iter()
            .map(|(c, _)| c)
            .collect();
        assert_eq!(columns, ["body", "tag"]);
    }

    #[test]
    fn test_credential_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let mut c = Credential::draft(at(0), [false, true, false, true]);
        c.title = "bank".to_string();
        c.fields[1].value = "s3cret".to_string();
        c.tag = TagColor::Purple;

        let id = CredentialTable::insert(db.conn(), &mut c).unwrap();
        let loaded = CredentialTable::get(db.conn(), id).unwrap().unwrap();
        assert_eq!(loaded, c);

        c.fields[3].locked = false;
        assert!(CredentialTable::update_changed(db.conn(), &c).unwrap());
        let loaded = CredentialTable::get(db.conn(), id).unwrap().unwrap();
        assert_eq!(loaded.locks(), [false, true, false, false]);
    }

    #[test]
    fn test_delete_and_delete_all() {
        let db = Database::open_in_memory().unwrap();
        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(NoteTable::insert(db.conn(), &mut note("n", i)).unwrap());
        }

        assert!(NoteTable::delete(db.conn(), ids[0]).unwrap());
        assert!(!NoteTable::delete(db.conn(), ids[0]).unwrap());
        assert_eq!(NoteTable::delete_ids(db.conn(), &ids[1..3]).unwrap(), 2);
        assert_eq!(NoteTable::delete_all(db.conn()).unwrap(), 1);
        assert_eq!(NoteTable::count(db.conn()).unwrap(), 0);
    }

    #[test]
    fn test_update_missing_row_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let mut n = note("gone", 0);
        n.id = Some(42);
        assert!(matches!(
            NoteTable::update_changed(db.conn(), &n),
            Err(Error::NotFound(_))
        ));
    }
}
