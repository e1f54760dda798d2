//! Typed settings over a string-encoded key-value store
//!
//! Every value is persisted as text so data written by earlier releases keeps
//! reading back the same way: booleans are `"1"`/`"0"`, integers are decimal
//! strings, and the per-field lock defaults are an array of four `"1"`/`"0"`
//! strings. Malformed values never fail a read; they fall back to defaults.

use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

/// Persisted key names
pub mod keys {
    /// Selected main-list tab
    pub const SELECTED_TAB: &str = "dTapNum";
    /// Sort option for the main list
    pub const SORT_OPTION: &str = "dList";
    /// Index into [`super::TIMEOUT_OPTIONS`]
    pub const TIMEOUT_INDEX: &str = "dTimeOut";
    /// Passcode mode instead of biometrics
    pub const USE_PASSWORD: &str = "dUsePassword";
    /// Blur photo thumbnails in the list
    pub const IMAGE_BLUR: &str = "dImageBlur";
    /// Default hide flags for the four credential fields
    pub const DEFAULT_FIELD_LOCKS: &str = "dPasscodeDefault";
    /// Help overlay was shown once
    pub const HELP_SHOWN: &str = "dHelpInitial";
    /// Main passcode (plain digits or an Argon2 PHC string)
    pub const MAIN_PASSCODE: &str = "dMainPasscode";
    /// First-launch biometric question was answered
    pub const FIRST_LAUNCH_ACKNOWLEDGED: &str = "dInitial";
}

/// Auto-lock timeouts in seconds, selected by index
pub const TIMEOUT_OPTIONS: [u64; 4] = [10, 30, 60, 90];

/// Timeout used when the stored index does not map to an option
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Number of lockable credential fields
pub const FIELD_LOCK_COUNT: usize = 4;

const TRUE_STR: &str = "1";
const FALSE_STR: &str = "0";

/// Raw storage behind [`Settings`]
///
/// Implementations only move strings around; all encoding rules live in
/// [`Settings`].
pub trait SettingsBackend: Send + Sync {
    /// Read a string value
    fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Write a string value
    fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Read an array of strings
    fn get_string_array(&self, key: &str) -> Result<Option<Vec<String>>>;

    /// Write an array of strings
    fn set_string_array(&self, key: &str, values: &[String]) -> Result<()>;

    /// Remove a key of either shape
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
enum StoredValue {
    Text(String),
    List(Vec<String>),
}

/// In-memory backend for tests and hosts that persist settings elsewhere
#[derive(Debug, Default)]
pub struct MemorySettingsBackend {
    values: RwLock<HashMap<String, StoredValue>>,
}

impl MemorySettingsBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether no key is stored
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl SettingsBackend for MemorySettingsBackend {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(match self.values.read().get(key) {
            Some(StoredValue::Text(s)) => Some(s.clone()),
            _ => None,
        })
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .insert(key.to_string(), StoredValue::Text(value.to_string()));
        Ok(())
    }

    fn get_string_array(&self, key: &str) -> Result<Option<Vec<String>>> {
        Ok(match self.values.read().get(key) {
            Some(StoredValue::List(v)) => Some(v.clone()),
            _ => None,
        })
    }

    fn set_string_array(&self, key: &str, values: &[String]) -> Result<()> {
        self.values
            .write()
            .insert(key.to_string(), StoredValue::List(values.to_vec()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Typed settings handle
///
/// Cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct Settings {
    backend: Arc<dyn SettingsBackend>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings").finish_non_exhaustive()
    }
}

impl Settings {
    /// Wrap a backend
    pub fn new(backend: Arc<dyn SettingsBackend>) -> Self {
        Self { backend }
    }

    /// Settings over a fresh [`MemorySettingsBackend`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySettingsBackend::new()))
    }

    /// Replace the backend, e.g. to isolate a test
    pub fn inject(&mut self, backend: Arc<dyn SettingsBackend>) {
        self.backend = backend;
    }

    /// Write defaults for keys that have never been set
    pub fn register_defaults(&self) -> Result<()> {
        let string_defaults = [
            (keys::SELECTED_TAB, "0"),
            (keys::TIMEOUT_INDEX, "2"),
            (keys::SORT_OPTION, "1"),
            (keys::IMAGE_BLUR, FALSE_STR),
            (keys::USE_PASSWORD, TRUE_STR),
        ];
        for (key, value) in string_defaults {
            if self.backend.get_string(key)?.is_none() {
                self.backend.set_string(key, value)?;
            }
        }
        if self.backend.get_string_array(keys::DEFAULT_FIELD_LOCKS)?.is_none() {
            let all_false = vec![FALSE_STR.to_string(); FIELD_LOCK_COUNT];
            self.backend
                .set_string_array(keys::DEFAULT_FIELD_LOCKS, &all_false)?;
        }
        tracing::debug!("Registered default settings");
        Ok(())
    }

    // Reads never fail: a backend error is logged and treated as a missing key.
    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get_string(key) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, error = %e, "Settings read failed, using default");
                None
            }
        }
    }

    fn read_int(&self, key: &str) -> i64 {
        self.read(key)
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0)
    }

    fn write_int(&self, key: &str, value: i64) -> Result<()> {
        self.backend.set_string(key, &value.to_string())
    }

    fn write_bool(&self, key: &str, value: bool) -> Result<()> {
        self.backend
            .set_string(key, if value { TRUE_STR } else { FALSE_STR })
    }

    /// Selected main-list tab index
    pub fn selected_tab(&self) -> i64 {
        self.read_int(keys::SELECTED_TAB)
    }

    /// Set the selected tab index
    pub fn set_selected_tab(&self, index: i64) -> Result<()> {
        self.write_int(keys::SELECTED_TAB, index)
    }

    /// Sort option index
    pub fn sort_option(&self) -> i64 {
        self.read_int(keys::SORT_OPTION)
    }

    /// Set the sort option index
    pub fn set_sort_option(&self, index: i64) -> Result<()> {
        self.write_int(keys::SORT_OPTION, index)
    }

    /// Auto-lock timeout index
    pub fn timeout_index(&self) -> i64 {
        self.read_int(keys::TIMEOUT_INDEX)
    }

    /// Set the auto-lock timeout index
    pub fn set_timeout_index(&self, index: i64) -> Result<()> {
        self.write_int(keys::TIMEOUT_INDEX, index)
    }

    /// Auto-lock timeout in seconds, [`DEFAULT_TIMEOUT_SECS`] for unknown indices
    pub fn timeout_seconds(&self) -> u64 {
        timeout_for_index(self.timeout_index())
    }

    /// Auto-lock timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }

    /// Passcode mode; anything other than an explicit `"0"` reads as on
    pub fn use_password(&self) -> bool {
        self.read(keys::USE_PASSWORD).as_deref() != Some(FALSE_STR)
    }

    /// Switch between passcode and biometric unlock
    pub fn set_use_password(&self, value: bool) -> Result<()> {
        self.write_bool(keys::USE_PASSWORD, value)
    }

    /// Blur photo thumbnails; anything other than an explicit `"0"` reads as on
    pub fn image_blur(&self) -> bool {
        self.read(keys::IMAGE_BLUR).as_deref() != Some(FALSE_STR)
    }

    /// Set thumbnail blurring
    pub fn set_image_blur(&self, value: bool) -> Result<()> {
        self.write_bool(keys::IMAGE_BLUR, value)
    }

    /// Whether the help overlay was shown
    pub fn help_shown(&self) -> bool {
        self.read(keys::HELP_SHOWN).as_deref() == Some(TRUE_STR)
    }

    /// Record that the help overlay was shown
    pub fn set_help_shown(&self, value: bool) -> Result<()> {
        self.write_bool(keys::HELP_SHOWN, value)
    }

    /// Whether the first-launch biometric question was answered
    pub fn first_launch_acknowledged(&self) -> bool {
        self.read(keys::FIRST_LAUNCH_ACKNOWLEDGED).as_deref() == Some(TRUE_STR)
    }

    /// Record the answer to the first-launch biometric question
    pub fn set_first_launch_acknowledged(&self, value: bool) -> Result<()> {
        self.write_bool(keys::FIRST_LAUNCH_ACKNOWLEDGED, value)
    }

    /// Default hide flags applied to new credential records
    pub fn default_field_locks(&self) -> [bool; FIELD_LOCK_COUNT] {
        let mut flags = [false; FIELD_LOCK_COUNT];
        let stored = match self.backend.get_string_array(keys::DEFAULT_FIELD_LOCKS) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Settings read failed, using default field locks");
                None
            }
        };
        if let Some(values) = stored {
            for (flag, value) in flags.iter_mut().zip(values.iter()) {
                *flag = value == TRUE_STR;
            }
        }
        flags
    }

    /// Store default hide flags for new credential records
    pub fn set_default_field_locks(&self, flags: [bool; FIELD_LOCK_COUNT]) -> Result<()> {
        let encoded: Vec<String> = flags
            .iter()
            .map(|&f| if f { TRUE_STR } else { FALSE_STR }.to_string())
            .collect();
        self.backend
            .set_string_array(keys::DEFAULT_FIELD_LOCKS, &encoded)
    }

    /// Stored main passcode, `None` when unset or empty
    pub fn main_passcode(&self) -> Option<Zeroizing<String>> {
        self.read(keys::MAIN_PASSCODE)
            .filter(|s| !s.is_empty())
            .map(Zeroizing::new)
    }

    /// Whether a main passcode is stored
    pub fn has_main_passcode(&self) -> bool {
        self.main_passcode().is_some()
    }

    /// Store the main passcode verbatim
    pub fn set_main_passcode(&self, stored: &str) -> Result<()> {
        self.backend.set_string(keys::MAIN_PASSCODE, stored)
    }

    /// Remove the main passcode
    pub fn remove_main_passcode(&self) -> Result<()> {
        self.backend.remove(keys::MAIN_PASSCODE)
    }
}

/// Map a timeout index to seconds
pub fn timeout_for_index(index: i64) -> u64 {
    usize::try_from(index)
        .ok()
        .and_then(|i| TIMEOUT_OPTIONS.get(i).copied())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}
