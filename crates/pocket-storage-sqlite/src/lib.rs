//! SQLite storage for Secret Pocket
//!
//! Holds the three record kinds (notes, photos, credentials) in one WAL-mode
//! database with versioned migrations, a settings table backing
//! [`pocket_core::Settings`], the record editors, and the [`Vault`] facade
//! that wires them together.
//!
//! ## Saving
//!
//! - Drafts are inserted once and get their row id back
//! - Later saves write only the columns that changed, or nothing at all
//! - Editor write failures are logged and otherwise ignored

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod database;
pub mod editors;
pub mod error;
pub mod image_cache;
pub mod imaging;
pub mod migrations;
pub mod models;
pub mod record_list;
pub mod records;
pub mod settings_backend;
pub mod vault;

pub use database::Database;
pub use editors::{CredentialEditor, NoteEditor, NoteField, PhotoEditor};
pub use error::{Error, Result};
pub use image_cache::ImageCache;
pub use imaging::Orientation;
pub use models::*;
pub use record_list::{ListItems, RecordList};
pub use records::{ColumnChange, CredentialTable, NoteTable, PhotoTable, RecordTable};
pub use settings_backend::SqliteSettingsBackend;
pub use vault::Vault;
