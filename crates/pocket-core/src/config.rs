//! Vault configuration
//!
//! Loaded from an optional JSON file; every field has a default so a
//! partial file (or none at all) is valid.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the database location
pub const DATABASE_PATH_ENV: &str = "POCKET_DB_PATH";

/// Database file name inside the platform data directory
pub const DATABASE_FILE_NAME: &str = "pocket.sqlite3";

/// Passcode entry behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasscodeConfig {
    /// Digits per passcode
    pub length: usize,
    /// Failed verifications before the entry surface is torn down
    pub max_failed_attempts: u32,
    /// Delay between the last digit and evaluation, in milliseconds
    pub debounce_ms: u64,
    /// Delay between the final failure and teardown, in milliseconds
    pub teardown_ms: u64,
    /// Store new passcodes as Argon2id PHC strings instead of plain digits
    pub hash_new_passcodes: bool,
}

impl Default for PasscodeConfig {
    fn default() -> Self {
        Self {
            length: 6,
            max_failed_attempts: 3,
            debounce_ms: 250,
            teardown_ms: 800,
            hash_new_passcodes: true,
        }
    }
}

impl PasscodeConfig {
    /// Debounce as a [`Duration`]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Teardown delay as a [`Duration`]
    pub fn teardown(&self) -> Duration {
        Duration::from_millis(self.teardown_ms)
    }
}

/// Photo handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoConfig {
    /// Longest edge of generated thumbnails in pixels
    pub thumbnail_size: u32,
    /// Decoded images kept in memory by the photo editor
    pub cache_capacity: usize,
    /// JPEG quality used when re-encoding edited images
    pub jpeg_quality: u8,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            thumbnail_size: 256,
            cache_capacity: 16,
            jpeg_quality: 100,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Database file; platform data directory when unset
    pub database_path: Option<PathBuf>,
    /// Rows fetched per list query
    pub fetch_batch_size: usize,
    /// Seconds before a copied hidden credential field is cleared
    pub clipboard_clear_secs: u64,
    /// Passcode entry
    pub passcode: PasscodeConfig,
    /// Photos
    pub photo: PhotoConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            fetch_batch_size: 30,
            clipboard_clear_secs: 30,
            passcode: PasscodeConfig::default(),
            photo: PhotoConfig::default(),
        }
    }
}

impl VaultConfig {
    /// Load and validate a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "Loaded vault config");
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values the rest of the crate cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.passcode.length == 0 {
            return Err(Error::Config("passcode.length must be at least 1".to_string()));
        }
        if self.passcode.max_failed_attempts == 0 {
            return Err(Error::Config(
                "passcode.max_failed_attempts must be at least 1".to_string(),
            ));
        }
        if self.fetch_batch_size == 0 {
            return Err(Error::Config("fetch_batch_size must be at least 1".to_string()));
        }
        if self.photo.thumbnail_size == 0 {
            return Err(Error::Config("photo.thumbnail_size must be at least 1".to_string()));
        }
        if self.photo.cache_capacity == 0 {
            return Err(Error::Config("photo.cache_capacity must be at least 1".to_string()));
        }
        if !(1..=100).contains(&self.photo.jpeg_quality) {
            return Err(Error::Config("photo.jpeg_quality must be 1-100".to_string()));
        }
        Ok(())
    }

    /// Resolved database path
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    /// Clipboard clear timeout as a [`Duration`]
    pub fn clipboard_clear_timeout(&self) -> Duration {
        Duration::from_secs(self.clipboard_clear_secs)
    }
}

/// Default database location, honouring [`DATABASE_PATH_ENV`]
pub fn default_database_path() -> PathBuf {
    if let Ok(path) = env::var(DATABASE_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "SecretPocket", "SecretPocket")
        .map(|dirs| dirs.data_local_dir().join(DATABASE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
}
