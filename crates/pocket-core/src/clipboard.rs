//! Clipboard access with automatic clearing of hidden credential fields
//!
//! Field values copied from a credential are placed on the system clipboard
//! through a [`ClipboardPlatform`]. Values whose field lock is on are
//! treated as hidden and removed again once the configured timeout passes,
//! unless the user has since copied something else. Photos travel through
//! the same platform as encoded image bytes.

use crate::clock::Clock;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-clear timeout for hidden fields, in seconds
pub const DEFAULT_CLEAR_TIMEOUT_SECS: u64 = 30;

/// Kind of data placed on the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardDataType {
    /// Credential field whose lock is on
    HiddenField,
    /// Credential field shown in clear text
    Field,
    /// Encoded photo
    Image,
}

impl ClipboardDataType {
    /// Data type for a credential field with the given lock flag
    pub fn for_field(locked: bool) -> Self {
        if locked {
            Self::HiddenField
        } else {
            Self::Field
        }
    }

    /// Check if this data type requires auto-clear
    pub fn requires_auto_clear(&self) -> bool {
        matches!(self, Self::HiddenField)
    }
}

/// Platform clipboard interface
pub trait ClipboardPlatform: Send + Sync {
    /// Copy text to clipboard
    fn copy_text(&self, text: &str) -> bool;

    /// Current text content
    fn paste_text(&self) -> Option<String>;

    /// Copy encoded image bytes to clipboard
    fn copy_image(&self, bytes: &[u8]) -> bool;

    /// Current image content as encoded bytes
    fn paste_image(&self) -> Option<Vec<u8>>;

    /// Clear clipboard
    fn clear(&self) -> bool;

    /// Check if clipboard contains text
    fn has_text(&self) -> bool {
        self.paste_text().is_some()
    }

    /// Check if clipboard contains an image
    fn has_image(&self) -> bool {
        self.paste_image().is_some()
    }
}

#[derive(Debug, Clone)]
enum MockContent {
    Text(String),
    Image(Vec<u8>),
}

/// In-memory clipboard for tests and headless hosts
#[derive(Debug, Default)]
pub struct MockClipboard {
    content: RwLock<Option<MockContent>>,
}

impl MockClipboard {
    /// Empty clipboard
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardPlatform for MockClipboard {
    fn copy_text(&self, text: &str) -> bool {
        *self.content.write() = Some(MockContent::Text(text.to_string()));
        true
    }

    fn paste_text(&self) -> Option<String> {
        match &*self.content.read() {
            Some(MockContent::Text(text)) => Some(text.clone()),
            _ => None,
        }
    }

    fn copy_image(&self, bytes: &[u8]) -> bool {
        *self.content.write() = Some(MockContent::Image(bytes.to_vec()));
        true
    }

    fn paste_image(&self) -> Option<Vec<u8>> {
        match &*self.content.read() {
            Some(MockContent::Image(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    fn clear(&self) -> bool {
        *self.content.write() = None;
        true
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingClear {
    hash: [u8; 32],
    deadline: Instant,
}

fn content_hash(content: &[u8]) -> [u8; 32] {
    Sha256::digest(content).into()
}

/// Clipboard manager that clears hidden values after a timeout
pub struct SecureClipboard {
    platform: Arc<dyn ClipboardPlatform>,
    clock: Arc<dyn Clock>,
    clear_after: Duration,
    pending: RwLock<Option<PendingClear>>,
}

impl SecureClipboard {
    /// Manager over `platform` clearing hidden values after `clear_after`
    pub fn new(
        platform: Arc<dyn ClipboardPlatform>,
        clock: Arc<dyn Clock>,
        clear_after: Duration,
    ) -> Self {
        Self {
            platform,
            clock,
            clear_after,
            pending: RwLock::new(None),
        }
    }

    /// Underlying platform clipboard
    pub fn platform(&self) -> &Arc<dyn ClipboardPlatform> {
        &self.platform
    }

    /// Copy a text value, arming the auto-clear for hidden data
    pub fn copy_text(&self, content: &str, data_type: ClipboardDataType) -> bool {
        if !self.platform.copy_text(content) {
            tracing::warn!("Clipboard rejected text copy");
            return false;
        }
        if data_type.requires_auto_clear() {
            *self.pending.write() = Some(PendingClear {
                hash: content_hash(content.as_bytes()),
                deadline: self.clock.now() + self.clear_after,
            });
            tracing::debug!(
                clear_after_secs = self.clear_after.as_secs(),
                "Hidden value copied to clipboard"
            );
        } else {
            *self.pending.write() = None;
        }
        true
    }

    /// Copy encoded image bytes
    pub fn copy_image(&self, bytes: &[u8]) -> bool {
        *self.pending.write() = None;
        self.platform.copy_image(bytes)
    }

    /// Current text on the clipboard
    pub fn paste_text(&self) -> Option<String> {
        self.platform.paste_text()
    }

    /// Current image bytes on the clipboard
    pub fn paste_image(&self) -> Option<Vec<u8>> {
        self.platform.paste_image()
    }

    /// Whether an auto-clear is armed
    pub fn is_armed(&self) -> bool {
        self.pending.read().is_some()
    }

    /// Time left before the armed auto-clear
    pub fn remaining(&self) -> Option<Duration> {
        let pending = (*self.pending.read())?;
        Some(pending.deadline.saturating_duration_since(self.clock.now()))
    }

    /// Verify current clipboard content matches what we copied
    pub fn verify_content(&self, current: &str) -> bool {
        match *self.pending.read() {
            Some(pending) => pending.hash == content_hash(current.as_bytes()),
            None => false,
        }
    }

    /// Clear the clipboard if the armed timeout has passed
    ///
    /// The clipboard is left alone when its content no longer matches the
    /// hidden value. Returns `true` when the platform clipboard was cleared.
    pub fn clear_if_expired(&self) -> bool {
        let pending = match *self.pending.read() {
            Some(pending) => pending,
            None => return false,
        };
        if self.clock.now() < pending.deadline {
            return false;
        }
        *self.pending.write() = None;

        let still_ours = self
            .platform
            .paste_text()
            .map(|current| content_hash(current.as_bytes()) == pending.hash)
            .unwrap_or(false);
        if still_ours {
            tracing::debug!("Clearing hidden value from clipboard");
            self.platform.clear()
        } else {
            false
        }
    }

    /// Disarm the auto-clear without touching the clipboard
    pub fn cancel(&self) {
        *self.pending.write() = None;
    }
}
