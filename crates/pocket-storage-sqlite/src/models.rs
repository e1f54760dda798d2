//! Record models

use chrono::{DateTime, Utc};
use pocket_core::{TagColor, FIELD_LOCK_COUNT};
use serde::{Deserialize, Serialize};

/// Record kind shown by a main-list tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Text memo ("Memo" tab)
    Note,
    /// Photo ("Image" tab)
    Photo,
    /// Password record ("Passcode" tab)
    Credential,
}

impl RecordKind {
    /// Kind for a stored tab index; unknown indices show notes
    pub fn from_tab(index: i64) -> Self {
        match index {
            1 => RecordKind::Photo,
            2 => RecordKind::Credential,
            _ => RecordKind::Note,
        }
    }

    /// Tab index for this kind
    pub fn tab_index(&self) -> i64 {
        match self {
            RecordKind::Note => 0,
            RecordKind::Photo => 1,
            RecordKind::Credential => 2,
        }
    }

    /// Tab label
    pub fn tab_title(&self) -> &'static str {
        match self {
            RecordKind::Note => "Memo",
            RecordKind::Photo => "Image",
            RecordKind::Credential => "Passcode",
        }
    }
}

/// List ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Oldest first
    DateAscending,
    /// Newest first
    DateDescending,
    /// By title
    TitleAscending,
}

impl SortOrder {
    /// Order for a stored sort index; 2 and above sort by title
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => SortOrder::DateAscending,
            1 => SortOrder::DateDescending,
            _ => SortOrder::TitleAscending,
        }
    }

    pub(crate) fn order_by(&self) -> &'static str {
        match self {
            SortOrder::DateAscending => "modified_at ASC, id ASC",
            SortOrder::DateDescending => "modified_at DESC, id DESC",
            SortOrder::TitleAscending => "title ASC, id ASC",
        }
    }
}

/// Common record surface
pub trait Record {
    /// Row id, `None` while the record is a draft
    fn id(&self) -> Option<i64>;

    /// Attach the row id after the first insert
    fn set_id(&mut self, id: i64);

    /// Title shown in the list
    fn title(&self) -> &str;

    /// Last real modification
    fn modified_at(&self) -> DateTime<Utc>;

    /// Whether the record was never inserted
    fn is_draft(&self) -> bool {
        self.id().is_none()
    }
}

/// Text memo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Row id
    pub id: Option<i64>,
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Color tag
    pub tag: TagColor,
    /// Last modification
    pub modified_at: DateTime<Utc>,
}

impl Note {
    /// Empty draft
    pub fn draft(now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: String::new(),
            body: String::new(),
            tag: TagColor::None,
            modified_at: now,
        }
    }
}

impl Record for Note {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}

/// Photo with its derived thumbnail
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Row id
    pub id: Option<i64>,
    /// Title
    pub title: String,
    /// Encoded full image
    pub image: Vec<u8>,
    /// Encoded thumbnail
    pub thumbnail: Vec<u8>,
    /// Last modification
    pub modified_at: DateTime<Utc>,
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photo")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("image_len", &self.image.len())
            .field("thumbnail_len", &self.thumbnail.len())
            .field("modified_at", &self.modified_at)
            .finish()
    }
}

impl Photo {
    /// Draft without an image
    pub fn draft(now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: String::new(),
            image: Vec::new(),
            thumbnail: Vec::new(),
            modified_at: now,
        }
    }

    /// Whether an image was set
    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }
}

impl Record for Photo {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}

/// One credential slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialField {
    /// Stored text
    pub value: String,
    /// Hide the value behind dots
    pub locked: bool,
}

/// Password record with four fixed slots
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Row id
    pub id: Option<i64>,
    /// Title
    pub title: String,
    /// Slots in display order
    pub fields: [CredentialField; FIELD_LOCK_COUNT],
    /// Color tag
    pub tag: TagColor,
    /// Last modification
    pub modified_at: DateTime<Utc>,
}

// Field values never reach logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let locks: Vec<bool> = self.fields.iter().map(|field| field.locked).collect();
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("locks", &locks)
            .field("tag", &self.tag)
            .field("modified_at", &self.modified_at)
            .finish_non_exhaustive()
    }
}

impl Credential {
    /// Empty draft with the given default lock flags
    pub fn draft(now: DateTime<Utc>, locks: [bool; FIELD_LOCK_COUNT]) -> Self {
        Self {
            id: None,
            title: String::new(),
            fields: locks.map(|locked| CredentialField {
                value: String::new(),
                locked,
            }),
            tag: TagColor::None,
            modified_at: now,
        }
    }

    /// Slot at `index`
    pub fn field(&self, index: usize) -> Option<&CredentialField> {
        self.fields.get(index)
    }

    /// Mutable slot at `index`
    pub fn field_mut(&mut self, index: usize) -> Option<&mut CredentialField> {
        self.fields.get_mut(index)
    }

    /// Lock flags in slot order
    pub fn locks(&self) -> [bool; FIELD_LOCK_COUNT] {
        let mut locks = [false; FIELD_LOCK_COUNT];
        for (lock, field) in locks.iter_mut().zip(self.fields.iter()) {
            *lock = field.locked;
        }
        locks
    }
}

impl Record for Credential {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_and_sort_mapping() {
        assert_eq!(RecordKind::from_tab(1), RecordKind::Photo);
        assert_eq!(RecordKind::from_tab(2), RecordKind::Credential);
        assert_eq!(RecordKind::from_tab(7), RecordKind::Note);
        assert_eq!(RecordKind::from_tab(-1), RecordKind::Note);

        assert_eq!(SortOrder::from_index(0), SortOrder::DateAscending);
        assert_eq!(SortOrder::from_index(1), SortOrder::DateDescending);
        assert_eq!(SortOrder::from_index(2), SortOrder::TitleAscending);
        assert_eq!(SortOrder::from_index(9), SortOrder::TitleAscending);
    }

    #[test]
    fn test_credential_draft_applies_locks() {
        let draft = Credential::draft(Utc::now(), [true, false, false, true]);
        assert!(draft.is_draft());
        assert_eq!(draft.locks(), [true, false, false, true]);
        assert!(draft.field(4).is_none());
        assert!(!format!("{:?}", draft).contains("value"));
    }
}
