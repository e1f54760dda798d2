//! Main list
//!
//! Shows the records of the kind picked by the selected tab, in the stored
//! sort order, loaded in batches.

use crate::models::{Credential, Note, Photo, RecordKind, SortOrder};
use crate::records::{CredentialTable, NoteTable, PhotoTable, RecordTable};
use crate::Result;
use pocket_core::Settings;
use rusqlite::Connection;

/// Loaded rows of one kind
#[derive(Debug, Clone)]
pub enum ListItems {
    /// Memo tab
    Notes(Vec<Note>),
    /// Image tab
    Photos(Vec<Photo>),
    /// Passcode tab
    Credentials(Vec<Credential>),
}

impl ListItems {
    fn empty(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Note => ListItems::Notes(Vec::new()),
            RecordKind::Photo => ListItems::Photos(Vec::new()),
            RecordKind::Credential => ListItems::Credentials(Vec::new()),
        }
    }

    /// Loaded rows
    pub fn len(&self) -> usize {
        match self {
            ListItems::Notes(v) => v.len(),
            ListItems::Photos(v) => v.len(),
            ListItems::Credentials(v) => v.len(),
        }
    }

    /// Whether nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn id_at(&self, index: usize) -> Option<i64> {
        match self {
            ListItems::Notes(v) => v.get(index).and_then(|r| r.id),
            ListItems::Photos(v) => v.get(index).and_then(|r| r.id),
            ListItems::Credentials(v) => v.get(index).and_then(|r| r.id),
        }
    }

    fn titles(&self) -> Vec<&str> {
        match self {
            ListItems::Notes(v) => v.iter().map(|r| r.title.as_str()).collect(),
            ListItems::Photos(v) => v.iter().map(|r| r.title.as_str()).collect(),
            ListItems::Credentials(v) => v.iter().map(|r| r.title.as_str()).collect(),
        }
    }
}

fn page<T: RecordTable>(
    conn: &Connection,
    sort: SortOrder,
    offset: usize,
    limit: usize,
) -> Result<Vec<T::Record>> {
    T::fetch_page(conn, sort, offset, Some(limit))
}

/// Records of the selected tab
pub struct RecordList {
    kind: RecordKind,
    sort: SortOrder,
    batch_size: usize,
    items: ListItems,
    exhausted: bool,
}

impl RecordList {
    /// Empty list for the tab and sort stored in `settings`; call [`RecordList::reload`]
    pub fn new(settings: &Settings, batch_size: usize) -> Self {
        let kind = RecordKind::from_tab(settings.selected_tab());
        Self {
            kind,
            sort: SortOrder::from_index(settings.sort_option()),
            batch_size: batch_size.max(1),
            items: ListItems::empty(kind),
            exhausted: false,
        }
    }

    /// Kind being shown
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Current ordering
    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Loaded rows
    pub fn items(&self) -> &ListItems {
        &self.items
    }

    /// Titles of the loaded rows in display order
    pub fn titles(&self) -> Vec<&str> {
        self.items.titles()
    }

    /// Whether every row has been loaded
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Switch tab, persisting the choice, and reload
    pub fn select_tab(
        &mut self,
        conn: &Connection,
        settings: &Settings,
        kind: RecordKind,
    ) -> Result<()> {
        settings.set_selected_tab(kind.tab_index())?;
        self.kind = kind;
        self.reload(conn)
    }

    /// Change ordering, persisting the choice, and reload
    pub fn set_sort(&mut self, conn: &Connection, settings: &Settings, index: i64) -> Result<()> {
        settings.set_sort_option(index)?;
        self.sort = SortOrder::from_index(index);
        self.reload(conn)
    }

    /// Drop loaded rows and fetch the first batch
    pub fn reload(&mut self, conn: &Connection) -> Result<()> {
        self.items = ListItems::empty(self.kind);
        self.exhausted = false;
        self.load_more(conn)?;
        Ok(())
    }

    /// Fetch the next batch; returns how many rows were added
    pub fn load_more(&mut self, conn: &Connection) -> Result<usize> {
        if self.exhausted {
            return Ok(0);
        }
        let offset = self.items.len();
        let (sort, limit) = (self.sort, self.batch_size);
        let added = match &mut self.items {
            ListItems::Notes(v) => {
                let rows = page::<NoteTable>(conn, sort, offset, limit)?;
                let n = rows.len();
                v.extend(rows);
                n
            }
            ListItems::Photos(v) => {
                let rows = page::<PhotoTable>(conn, sort, offset, limit)?;
                let n = rows.len();
                v.extend(rows);
                n
            }
            ListItems::Credentials(v) => {
                let rows = page::<CredentialTable>(conn, sort, offset, limit)?;
                let n = rows.len();
                v.extend(rows);
                n
            }
        };
        self.exhausted = added < limit;
        tracing::debug!(kind = ?self.kind, offset, added, "Loaded list batch");
        Ok(added)
    }

    fn delete_rows(&self, conn: &Connection, ids: &[i64]) -> Result<usize> {
        match self.kind {
            RecordKind::Note => NoteTable::delete_ids(conn, ids),
            RecordKind::Photo => PhotoTable::delete_ids(conn, ids),
            RecordKind::Credential => CredentialTable::delete_ids(conn, ids),
        }
    }

    /// Delete the row at `index`; out-of-range indices are ignored
    pub fn delete_at(&mut self, conn: &Connection, index: usize) -> Result<bool> {
        Ok(self.delete_many(conn, &[index])? == 1)
    }

    /// Delete the rows at `indices`, skipping out-of-range ones
    pub fn delete_many(&mut self, conn: &Connection, indices: &[usize]) -> Result<usize> {
        let mut ids: Vec<i64> = indices.iter().filter_map(|&i| self.items.id_at(i)).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(0);
        }
        let deleted = self.delete_rows(conn, &ids)?;
        let keep = |id: Option<i64>| id.map_or(true, |id| ids.binary_search(&id).is_err());
        match &mut self.items {
            ListItems::Notes(v) => v.retain(|r| keep(r.id)),
            ListItems::Photos(v) => v.retain(|r| keep(r.id)),
            ListItems::Credentials(v) => v.retain(|r| keep(r.id)),
        }
        tracing::info!(kind = ?self.kind, deleted, "Deleted records");
        Ok(deleted)
    }

    /// Delete every record of the shown kind
    pub fn delete_all(&mut self, conn: &Connection) -> Result<usize> {
        let deleted = match self.kind {
            RecordKind::Note => NoteTable::delete_all(conn)?,
            RecordKind::Photo => PhotoTable::delete_all(conn)?,
            RecordKind::Credential => CredentialTable::delete_all(conn)?,
        };
        self.items = ListItems::empty(self.kind);
        self.exhausted = true;
        tracing::info!(kind = ?self.kind, deleted, "Deleted all records");
        Ok(deleted)
    }
}
