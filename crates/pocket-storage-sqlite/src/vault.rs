//! Vault facade
//!
//! Opens the record database and the settings store, registers setting
//! defaults, and hands out editors and controllers wired to them.

use crate::database::Database;
use crate::editors::{CredentialEditor, NoteEditor, PhotoEditor};
use crate::models::{Photo, SortOrder};
use crate::record_list::RecordList;
use crate::records::{PhotoTable, RecordTable};
use crate::settings_backend::SqliteSettingsBackend;
use crate::Result;
use pocket_core::{
    AppLock, ClipboardPlatform, Clock, SecureClipboard, Settings, SystemClock, VaultConfig,
};
use rusqlite::Connection;
use std::sync::Arc;

/// Opened vault
pub struct Vault {
    db: Database,
    settings: Settings,
    clock: Arc<dyn Clock>,
    config: VaultConfig,
}

impl Vault {
    /// Open the vault at the configured database path
    ///
    /// Failure here is fatal for the host; nothing is usable without storage.
    pub fn open(config: &VaultConfig) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    /// Open with an explicit clock
    pub fn open_with_clock(config: &VaultConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let path = config.database_path();
        let db = Database::open(&path)?;
        let backend = SqliteSettingsBackend::open(&path)?;
        Self::assemble(db, Settings::new(Arc::new(backend)), clock, config.clone())
    }

    /// Private in-memory vault
    pub fn open_in_memory(config: &VaultConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let db = Database::open_in_memory()?;
        let backend = SqliteSettingsBackend::open_in_memory()?;
        Self::assemble(db, Settings::new(Arc::new(backend)), clock, config.clone())
    }

    fn assemble(
        db: Database,
        settings: Settings,
        clock: Arc<dyn Clock>,
        config: VaultConfig,
    ) -> Result<Self> {
        settings.register_defaults()?;
        tracing::info!(
            tab = settings.selected_tab(),
            use_password = settings.use_password(),
            "Vault opened"
        );
        Ok(Self {
            db,
            settings,
            clock,
            config,
        })
    }

    /// Record database connection
    pub fn conn(&self) -> &Connection {
        self.db.conn()
    }

    /// Record database
    pub fn database(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Settings handle
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Clock shared by editors and the lock
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Configuration the vault was opened with
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Editor for a new note
    pub fn note_editor(&self) -> NoteEditor {
        NoteEditor::new(self.clock())
    }

    /// Editor for a new credential with the default lock flags
    pub fn credential_editor(&self) -> CredentialEditor {
        CredentialEditor::new(&self.settings, self.clock())
    }

    /// Photo editor over the stored gallery in the current sort order
    pub fn photo_editor(&self) -> Result<PhotoEditor> {
        let sort = SortOrder::from_index(self.settings.sort_option());
        let gallery: Vec<Photo> = PhotoTable::fetch(self.conn(), sort)?;
        Ok(PhotoEditor::new(
            gallery,
            self.config.photo.clone(),
            self.clock(),
        ))
    }

    /// Main list loaded with its first batch
    pub fn record_list(&self) -> Result<RecordList> {
        let mut list = RecordList::new(&self.settings, self.config.fetch_batch_size);
        list.reload(self.conn())?;
        Ok(list)
    }

    /// Lock controller sharing this vault's settings and clock
    pub fn app_lock(&self) -> AppLock {
        AppLock::new(
            self.settings.clone(),
            self.config.passcode.clone(),
            self.clock(),
        )
    }

    /// Clipboard manager over the host clipboard
    pub fn secure_clipboard(&self, platform: Arc<dyn ClipboardPlatform>) -> SecureClipboard {
        SecureClipboard::new(platform, self.clock(), self.config.clipboard_clear_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_core::ManualClock;

    #[test]
    fn test_in_memory_vault_registers_defaults() {
        let vault =
            Vault::open_in_memory(&VaultConfig::default(), Arc::new(ManualClock::new())).unwrap();
        assert_eq!(vault.settings().selected_tab(), 0);
        assert!(vault.record_list().unwrap().items().is_empty());
        assert!(vault.photo_editor().unwrap().gallery().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = VaultConfig {
            fetch_batch_size: 0,
            ..Default::default()
        };
        assert!(Vault::open_in_memory(&config, Arc::new(ManualClock::new())).is_err());
    }
}
