//! Note editor

use super::log_save_result;
use crate::models::{Note, Record};
use crate::records::{NoteTable, RecordTable};
use crate::Result;
use pocket_core::text::{derive_title, format_timestamp, is_not_blank};
use pocket_core::{Clock, TagColor};
use rusqlite::Connection;
use std::sync::Arc;

/// Text field of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    /// Single-line title
    Title,
    /// Multi-line body
    Body,
}

/// Editor for one note
pub struct NoteEditor {
    draft: Note,
    clock: Arc<dyn Clock>,
}

impl NoteEditor {
    /// Editor for a new note
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            draft: Note::draft(clock.wall_now()),
            clock,
        }
    }

    /// Editor for a stored note
    pub fn open(note: Note, clock: Arc<dyn Clock>) -> Self {
        Self { draft: note, clock }
    }

    /// Start over with an empty draft
    pub fn reset(&mut self) {
        self.draft = Note::draft(self.clock.wall_now());
    }

    /// Current draft
    pub fn draft(&self) -> &Note {
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

    /// Whether title and body are both blank
    pub fn is_empty(&self) -> bool {
        !is_not_blank(&self.draft.title) && !is_not_blank(&self.draft.body)
    }

    fn touch(&mut self) {
        self.draft.modified_at = self.clock.wall_now();
    }

    /// Replace a text field; returns whether it changed
    pub fn set_text(&mut self, field: NoteField, text: &str) -> bool {
        let slot = match field {
            NoteField::Title => &mut self.draft.title,
            NoteField::Body => &mut self.draft.body,
        };
        if slot.as_str() == text {
            return false;
        }
        *slot = text.to_string();
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

    /// Commit edited text when the field loses focus
    ///
    /// Blank text is ignored and returns `false`. Otherwise the field is
    /// updated if it differs and the note is saved.
    pub fn update_if_needed(&mut self, conn: &Connection, text: &str, field: NoteField) -> bool {
        if !is_not_blank(text) {
            return false;
        }
        self.set_text(field, text);
        self.save_or_log(conn);
        true
    }

    /// Pick a tag and save, unless the note has no text yet
    pub fn select_tag(&mut self, conn: &Connection, tag: TagColor) -> bool {
        self.set_tag(tag);
        if self.is_empty() {
            return false;
        }
        self.save_or_log(conn)
    }

    /// Save the draft; `false` means nothing was written
    ///
    /// A blank title is replaced by the first line of the body.
    pub fn save(&mut self, conn: &Connection) -> Result<bool> {
        if !is_not_blank(&self.draft.title) {
            self.draft.title = derive_title(&self.draft.body);
        }
        NoteTable::save(conn, &mut self.draft)
    }

    /// Save, logging instead of returning a failure
    pub fn save_or_log(&mut self, conn: &Connection) -> bool {
        let result = self.save(conn);
        log_save_result("note", result)
    }

    /// The screen is going away; a new note dismissed by swipe is kept
    pub fn on_disappear(&mut self, conn: &Connection, is_pop_gesture: bool) -> bool {
        if is_pop_gesture && self.is_add_mode() && !self.is_empty() {
            return self.save_or_log(conn);
        }
        false
    }

    /// Delete the stored note; drafts have nothing to delete
    pub fn delete(&mut self, conn: &Connection) -> Result<bool> {
        match self.draft.id {
            Some(id) => NoteTable::delete(conn, id),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use pocket_core::ManualClock;
    use std::time::Duration;

    fn editor() -> (NoteEditor, Arc<ManualClock>, Database) {
        let clock = Arc::new(ManualClock::new());
        (NoteEditor::new(clock.clone()), clock, Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let (mut ed, _, db) = editor();
        assert!(!ed.update_if_needed(db.conn(), "  \n", NoteField::Body));
        assert!(ed.is_add_mode());
        assert_eq!(NoteTable::count(db.conn()).unwrap(), 0);
    }

    #[test]
    fn test_title_derived_from_body() {
        let (mut ed, _, db) = editor();
        assert!(ed.update_if_needed(
            db.conn(),
            "shopping list for the weekend\nmilk",
            NoteField::Body
        ));

        assert!(!ed.is_add_mode());
        assert_eq!(ed.draft().title, "shopping list for the we");
        let stored = NoteTable::get(db.conn(), ed.draft().id.unwrap()).unwrap().unwrap();
        assert_eq!(stored.title, "shopping list for the we");
    }

    #[test]
    fn test_timestamp_refreshes_only_on_change() {
        let (mut ed, clock, _) = editor();
        ed.set_text(NoteField::Title, "a");
        let first = ed.draft().modified_at;

        clock.advance(Duration::from_secs(60));
        assert!(!ed.set_text(NoteField::Title, "a"));
        assert!(!ed.set_tag(TagColor::None));
        assert_eq!(ed.draft().modified_at, first);

        assert!(ed.set_tag(TagColor::Red));
        assert!(ed.draft().modified_at > first);
    }

    #[test]
    fn test_tag_on_empty_note_does_not_save() {
        let (mut ed, _, db) = editor();
        assert!(!ed.select_tag(db.conn(), TagColor::Green));
        assert_eq!(NoteTable::count(db.conn()).unwrap(), 0);
    }

    #[test]
    fn test_swipe_away_autosaves_new_note_only() {
        let (mut ed, _, db) = editor();
        ed.set_text(NoteField::Body, "draft");
        assert!(!ed.on_disappear(db.conn(), false));
        assert!(ed.on_disappear(db.conn(), true));
        assert!(!ed.on_disappear(db.conn(), true));
        assert_eq!(NoteTable::count(db.conn()).unwrap(), 1);
    }

    #[test]
    fn test_delete() {
        let (mut ed, _, db) = editor();
        assert!(!ed.delete(db.conn()).unwrap());
        ed.update_if_needed(db.conn(), "bye", NoteField::Title);
        assert!(ed.delete(db.conn()).unwrap());
        assert_eq!(NoteTable::count(db.conn()).unwrap(), 0);
    }
}
