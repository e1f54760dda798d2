//! Photo editor
//!
//! Works on a gallery of stored photos plus one draft: either the selected
//! gallery entry or a new photo. Flip and rotate re-encode the pixels so
//! the stored bytes always match what is shown.

use super::log_save_result;
use crate::image_cache::ImageCache;
use crate::imaging::{self, Orientation};
use crate::models::{Photo, Record};
use crate::records::{PhotoTable, RecordTable};
use crate::Result;
use image::DynamicImage;
use pocket_core::text::{format_timestamp, is_not_blank};
use pocket_core::{Clock, PhotoConfig, SecureClipboard};
use rusqlite::Connection;
use std::sync::Arc;

/// Editor for the photo gallery
pub struct PhotoEditor {
    gallery: Vec<Photo>,
    current: Option<usize>,
    draft: Photo,
    orientation: Orientation,
    cache: ImageCache,
    config: PhotoConfig,
    clock: Arc<dyn Clock>,
}

impl PhotoEditor {
    /// Editor over `gallery`, starting with a new photo draft
    pub fn new(gallery: Vec<Photo>, config: PhotoConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            gallery,
            current: None,
            draft: Photo::draft(clock.wall_now()),
            orientation: Orientation::Up,
            cache: ImageCache::new(config.cache_capacity),
            config,
            clock,
        }
    }

    /// Stored photos in display order
    pub fn gallery(&self) -> &[Photo] {
        &self.gallery
    }

    /// Replace the gallery, e.g. after a refetch
    pub fn set_gallery(&mut self, gallery: Vec<Photo>) {
        self.gallery = gallery;
        self.cache.clear();
        self.current = None;
        self.draft = Photo::draft(self.clock.wall_now());
        self.orientation = Orientation::Up;
    }

    /// Start over with a new photo draft
    pub fn reset(&mut self) {
        // Unsaved edits of the previous draft must not stay cached.
        let previous = self.slot();
        self.cache.remove(previous);
        self.current = None;
        self.draft = Photo::draft(self.clock.wall_now());
        self.orientation = Orientation::Up;
        self.cache.remove(self.gallery.len());
    }

    /// Selected gallery index, `None` while adding
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Gallery page to show; the first page while adding
    pub fn page_index(&self) -> usize {
        self.current.unwrap_or(0)
    }

    /// Current draft
    pub fn draft(&self) -> &Photo {
        &self.draft
    }

    /// Whether the draft was never saved
    pub fn is_add_mode(&self) -> bool {
        self.draft.is_draft()
    }

    /// Whether the draft has no image yet
    pub fn is_image_empty(&self) -> bool {
        !self.draft.has_image()
    }

    /// Orientation reached by flips and rotations since the image was set
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Formatted modification time
    pub fn date_text(&self) -> String {
        format_timestamp(&self.draft.modified_at)
    }

    // Cache slot of the draft: its gallery index, or one past the end while adding.
    fn slot(&self) -> usize {
        self.current.unwrap_or(self.gallery.len())
    }

    fn touch(&mut self) {
        self.draft.modified_at = self.clock.wall_now();
    }

    /// Make the gallery entry at `index` the draft; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        let Some(photo) = self.gallery.get(index) else {
            return false;
        };
        let photo = photo.clone();
        // Unsaved edits of the previous draft must not stay cached.
        let previous = self.slot();
        self.cache.remove(previous);
        self.draft = photo;
        self.current = Some(index);
        self.orientation = Orientation::Up;
        true
    }

    /// Decoded image for a gallery page, cached
    pub fn image_at(&mut self, index: usize) -> Result<Option<&DynamicImage>> {
        if !self.cache.contains(index) {
            let bytes = if index == self.slot() {
                &self.draft.image
            } else {
                match self.gallery.get(index) {
                    Some(photo) => &photo.image,
                    None => return Ok(None),
                }
            };
            if bytes.is_empty() {
                return Ok(None);
            }
            let decoded = imaging::decode(bytes)?;
            self.cache.insert(index, decoded);
        }
        Ok(self.cache.get(index))
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

    /// Commit an edited title; saved only once an image is present
    pub fn commit_title(&mut self, conn: &Connection, text: &str) -> bool {
        if !self.set_title(text) || self.is_image_empty() {
            return false;
        }
        self.save_or_log(conn)
    }

    fn apply_image(&mut self, image: DynamicImage) -> Result<()> {
        let encoded = imaging::encode_jpeg(&image, self.config.jpeg_quality)?;
        let thumb = imaging::thumbnail(&image, self.config.thumbnail_size);
        self.draft.thumbnail = imaging::encode_jpeg(&thumb, self.config.jpeg_quality)?;
        self.draft.image = encoded;
        self.touch();
        let slot = self.slot();
        self.cache.insert(slot, image);
        Ok(())
    }

    /// Set the draft's image from encoded bytes (camera, library or paste)
    pub fn add_image(&mut self, bytes: &[u8]) -> Result<()> {
        let image = imaging::decode(bytes)?;
        self.orientation = Orientation::Up;
        self.apply_image(image)
    }

    /// Select the gallery entry at `index` and replace its image
    pub fn replace_image(&mut self, index: usize, bytes: &[u8]) -> Result<bool> {
        if !self.select(index) {
            return Ok(false);
        }
        self.add_image(bytes)?;
        Ok(true)
    }

    fn current_image(&mut self) -> Result<Option<DynamicImage>> {
        let slot = self.slot();
        Ok(self.image_at(slot)?.cloned())
    }

    /// Mirror the draft's image left to right
    pub fn flip_horizontal(&mut self) -> Result<bool> {
        let Some(image) = self.current_image()? else {
            return Ok(false);
        };
        self.apply_image(imaging::flip_horizontal(&image))?;
        self.orientation = self.orientation.mirrored();
        Ok(true)
    }

    /// Turn the draft's image a quarter clockwise
    pub fn rotate_clockwise(&mut self) -> Result<bool> {
        let Some(image) = self.current_image()? else {
            return Ok(false);
        };
        self.apply_image(imaging::rotate_clockwise(&image))?;
        self.orientation = self.orientation.rotated_clockwise();
        Ok(true)
    }

    /// Take an image from the clipboard and save it as the draft's image
    pub fn paste_from_clipboard(
        &mut self,
        conn: &Connection,
        clipboard: &SecureClipboard,
    ) -> Result<bool> {
        let Some(bytes) = clipboard.paste_image() else {
            return Ok(false);
        };
        self.add_image(&bytes)?;
        self.save(conn)
    }

    /// Save the draft; `false` means nothing was written
    ///
    /// Drafts without an image are not saved. A blank title is replaced by
    /// the formatted modification time.
    pub fn save(&mut self, conn: &Connection) -> Result<bool> {
        if self.is_image_empty() {
            return Ok(false);
        }
        if !is_not_blank(&self.draft.title) {
            self.draft.title = self.date_text();
        }

        let adding = self.draft.is_draft();
        let written = PhotoTable::save(conn, &mut self.draft)?;
        if adding {
            let index = self.gallery.len();
            self.gallery.push(self.draft.clone());
            self.current = Some(index);
        } else if let Some(entry) = self.current.and_then(|i| self.gallery.get_mut(i)) {
            *entry = self.draft.clone();
        }
        Ok(written)
    }

    /// Save, logging instead of returning a failure
    pub fn save_or_log(&mut self, conn: &Connection) -> bool {
        let result = self.save(conn);
        log_save_result("photo", result)
    }

    /// The screen is going away; a new photo dismissed by swipe is kept
    pub fn on_disappear(&mut self, conn: &Connection, is_pop_gesture: bool) -> bool {
        if is_pop_gesture && self.is_add_mode() {
            return self.save_or_log(conn);
        }
        false
    }

    /// Delete the selected photo and go back to a new draft
    pub fn delete(&mut self, conn: &Connection) -> Result<bool> {
        let (Some(index), Some(id)) = (self.current, self.draft.id) else {
            return Ok(false);
        };
        let deleted = PhotoTable::delete(conn, id)?;
        if index < self.gallery.len() {
            self.gallery.remove(index);
        }
        // Indices after the removed page shifted.
        self.cache.clear();
        self.current = None;
        self.draft = Photo::draft(self.clock.wall_now());
        self.orientation = Orientation::Up;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use image::{GenericImageView, Rgb, RgbImage};
    use pocket_core::{ClipboardPlatform, ManualClock, MockClipboard};
    use std::time::Duration;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 200, 30])));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn editor() -> (PhotoEditor, Arc<ManualClock>, Database) {
        let clock = Arc::new(ManualClock::new());
        let config = PhotoConfig {
            thumbnail_size: 16,
            ..Default::default()
        };
        (
            PhotoEditor::new(Vec::new(), config, clock.clone()),
            clock,
            Database::open_in_memory().unwrap(),
        )
    }

    #[test]
    fn test_save_without_image_is_noop() {
        let (mut ed, _, db) = editor();
        ed.set_title("empty");
        assert!(!ed.save(db.conn()).unwrap());
        assert_eq!(PhotoTable::count(db.conn()).unwrap(), 0);
    }

    #[test]
    fn test_add_titles_with_date_and_joins_gallery() {
        let (mut ed, _, db) = editor();
        ed.add_image(&png(64, 32)).unwrap();
        let expected_title = ed.date_text();

        assert!(ed.save(db.conn()).unwrap());

        assert_eq!(ed.gallery().len(), 1);
        assert_eq!(ed.current_index(), Some(0));
        assert_eq!(ed.draft().title, expected_title);
        let thumb = imaging::decode(&ed.draft().thumbnail).unwrap();
        assert_eq!(thumb.dimensions(), (16, 8));
    }

    #[test]
    fn test_rotate_and_flip_update_stored_image() {
        let (mut ed, clock, db) = editor();
        ed.add_image(&png(40, 20)).unwrap();
        ed.save(db.conn()).unwrap();
        let saved_at = ed.draft().modified_at;

        clock.advance(Duration::from_secs(3));
        assert!(ed.rotate_clockwise().unwrap());
        assert!(ed.flip_horizontal().unwrap());
        assert_eq!(ed.orientation(), Orientation::RightMirrored);
        assert!(ed.draft().modified_at > saved_at);
        assert!(ed.save(db.conn()).unwrap());

        let stored = PhotoTable::get(db.conn(), ed.draft().id.unwrap()).unwrap().unwrap();
        assert_eq!(imaging::decode(&stored.image).unwrap().dimensions(), (20, 40));
    }

    #[test]
    fn test_reset_drops_unsaved_edit_of_selected_photo() {
        let (mut ed, _, db) = editor();
        ed.add_image(&png(40, 20)).unwrap();
        ed.save(db.conn()).unwrap();
        ed.reset();

        assert!(ed.select(0));
        assert!(ed.rotate_clockwise().unwrap());
        ed.reset();

        let stored = imaging::decode(&ed.gallery()[0].image).unwrap().dimensions();
        let shown = ed.image_at(0).unwrap().unwrap().dimensions();
        assert_eq!(stored, (40, 20));
        assert_eq!(shown, stored);
    }

    #[test]
    fn test_cleared_title_of_stored_photo_falls_back_to_date() {
        let (mut ed, clock, db) = editor();
        ed.add_image(&png(8, 8)).unwrap();
        ed.set_title("holiday");
        ed.save(db.conn()).unwrap();

        clock.advance(Duration::from_secs(120));
        ed.set_title("");
        assert!(ed.save(db.conn()).unwrap());

        let expected = ed.date_text();
        assert_eq!(ed.draft().title, expected);
        let stored = PhotoTable::get(db.conn(), ed.draft().id.unwrap()).unwrap().unwrap();
        assert_eq!(stored.title, expected);
        assert_eq!(ed.gallery()[0].title, expected);
    }

    #[test]
    fn test_transform_without_image_does_nothing() {
        let (mut ed, _, _) = editor();
        assert!(!ed.rotate_clockwise().unwrap());
        assert!(!ed.flip_horizontal().unwrap());
    }

    #[test]
    fn test_select_is_bounds_checked() {
        let (mut ed, _, db) = editor();
        assert!(!ed.select(0));
        ed.add_image(&png(8, 8)).unwrap();
        ed.save(db.conn()).unwrap();
        ed.reset();
        assert!(ed.is_add_mode());
        assert!(ed.select(0));
        assert!(!ed.select(1));
        assert!(!ed.replace_image(3, &png(4, 4)).unwrap());
    }

    #[test]
    fn test_paste_from_clipboard() {
        let (mut ed, clock, db) = editor();
        let platform = Arc::new(MockClipboard::new());
        let clipboard = SecureClipboard::new(platform.clone(), clock, Duration::from_secs(30));

        assert!(!ed.paste_from_clipboard(db.conn(), &clipboard).unwrap());
        platform.copy_image(&png(12, 12));
        assert!(ed.paste_from_clipboard(db.conn(), &clipboard).unwrap());
        assert_eq!(PhotoTable::count(db.conn()).unwrap(), 1);
    }

    #[test]
    fn test_delete_returns_to_add_mode() {
        let (mut ed, _, db) = editor();
        ed.add_image(&png(8, 8)).unwrap();
        ed.save(db.conn()).unwrap();

        assert!(ed.delete(db.conn()).unwrap());
        assert!(ed.is_add_mode());
        assert!(ed.gallery().is_empty());
        assert_eq!(PhotoTable::count(db.conn()).unwrap(), 0);
    }
}
