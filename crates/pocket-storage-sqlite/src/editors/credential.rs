//! Credential editor

use super::log_save_result;
use crate::models::{Credential, Record};
use crate::records::{CredentialTable, RecordTable};
use crate::Result;
use pocket_core::text::{format_timestamp, is_not_blank};
use pocket_core::{ClipboardDataType, Clock, SecureClipboard, Settings, TagColor};
use rusqlite::Connection;
use std::sync::Arc;

/// Editor for one credential
pub struct CredentialEditor {
    draft: Credential,
    clock: Arc<dyn Clock>,
}

impl CredentialEditor {
    /// Editor for a new credential using the default lock flags
    pub fn new(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        Self {
            draft: Credential::draft(clock.wall_now(), settings.default_field_locks()),
            clock,
        }
    }

    /// Editor for a stored credential
    pub fn open(credential: Credential, clock: Arc<dyn Clock>) -> Self {
        Self {
            draft: credential,
            clock,
        }
    }

    /// Start over with an empty draft
    pub fn reset(&mut self, settings: &Settings) {
        self.draft = Credential::draft(self.clock.wall_now(), settings.default_field_locks());
    }

    /// Current draft
    pub fn draft(&self) -> &Credential {
        &self.draft
    }

    /// Whether the draft was never saved
    pub fn is_add_mode(&self) -> bool {
        self.draft.is_draft()
    }

    /// Formatted modification time
    pub fn date_text(&self) -> String {
        format_timestamp(&self.draft.modified_at)
    }

    /// Whether the title or any field holds text
    pub fn has_any_content(&self) -> bool {
        is_not_blank(&self.draft.title)
            || self.draft.fields.iter().any(|f| is_not_blank(&f.value))
    }

    fn touch(&mut self) {
        self.draft.modified_at = self.clock.wall_now();
    }

    /// Replace the title; returns whether it changed
    pub fn set_title(&mut self, text: &str) -> bool {
        if self.draft.title == text {
            return false;
        }
        self.draft.title = text.to_string();
        self.touch();
        true
    }

    /// Replace a field value; out-of-range indices are ignored
    pub fn set_field(&mut self, index: usize, value: &str) -> bool {
        let Some(field) = self.draft.field_mut(index) else {
            return false;
        };
        if field.value == value {
            return false;
        }
        field.value = value.to_string();
        self.touch();
        true
    }

    /// Set a field's hide flag; out-of-range indices are ignored
    pub fn set_lock(&mut self, index: usize, locked: bool) -> bool {
        let Some(field) = self.draft.field_mut(index) else {
            return false;
        };
        if field.locked == locked {
            return false;
        }
        field.locked = locked;
        self.touch();
        true
    }

    /// Replace the tag; returns whether it changed
    pub fn set_tag(&mut self, tag: TagColor) -> bool {
        if self.draft.tag == tag {
            return false;
        }
        self.draft.tag = tag;
        self.touch();
        true
    }

    /// Toggle a hide flag from the screen; stored records are saved right away
    pub fn toggle_lock(&mut self, conn: &Connection, index: usize) -> bool {
        let Some(locked) = self.draft.field(index).map(|f| !f.locked) else {
            return false;
        };
        self.set_lock(index, locked);
        if !self.is_add_mode() {
            self.save_or_log(conn);
        }
        locked
    }

    /// Pick a tag from the screen; stored records are saved right away
    pub fn select_tag(&mut self, conn: &Connection, tag: TagColor) {
        self.set_tag(tag);
        if !self.is_add_mode() {
            self.save_or_log(conn);
        }
    }

    /// Save the draft; `false` means nothing was written
    ///
    /// A blank title is replaced by the formatted modification time.
    pub fn save(&mut self, conn: &Connection) -> Result<bool> {
        if !is_not_blank(&self.draft.title) {
            self.draft.title = self.date_text();
        }
        CredentialTable::save(conn, &mut self.draft)
    }

    /// Save, logging instead of returning a failure
    pub fn save_or_log(&mut self, conn: &Connection) -> bool {
        let result = self.save(conn);
        log_save_result("credential", result)
    }

    /// The screen is going away; a new credential dismissed by swipe is kept
    pub fn on_disappear(&mut self, conn: &Connection, is_pop_gesture: bool) -> bool {
        if is_pop_gesture && self.is_add_mode() && self.has_any_content() {
            return self.save_or_log(conn);
        }
        false
    }

    /// Delete the stored credential; drafts have nothing to delete
    pub fn delete(&mut self, conn: &Connection) -> Result<bool> {
        match self.draft.id {
            Some(id) => CredentialTable::delete(conn, id),
            None => Ok(false),
        }
    }

    /// Copy a field value; hidden fields are cleared from the clipboard later
    ///
    /// Blank values are not copied.
    pub fn copy_field(&self, index: usize, clipboard: &SecureClipboard) -> bool {
        let Some(field) = self.draft.field(index) else {
            return false;
        };
        if !is_not_blank(&field.value) {
            return false;
        }
        clipboard.copy_text(&field.value, ClipboardDataType::for_field(field.locked))
    }
}
