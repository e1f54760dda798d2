//! Secret Pocket core
//!
//! This crate implements the lock side of the vault: the passcode entry
//! state machine, the app-lock controller with its privacy cover and
//! background timeout, the string-encoded settings store, and the small
//! platform seams (biometrics, clipboard, clock) the host plugs into.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod biometric;
pub mod clipboard;
pub mod clock;
pub mod config;
pub mod error;
pub mod lock;
pub mod logging;
pub mod navigation;
pub mod passcode;
pub mod passcode_store;
pub mod privacy;
pub mod scheduler;
pub mod settings;
pub mod tag;
pub mod text;

pub use biometric::{
    biometric_authenticator, clear_biometric_authenticator, set_biometric_authenticator,
    BiometricAuthenticator, BiometricCapabilities, BiometricOutcome, BiometryKind,
    MockAuthenticator,
};
pub use clipboard::{
    ClipboardDataType, ClipboardPlatform, MockClipboard, SecureClipboard,
    DEFAULT_CLEAR_TIMEOUT_SECS,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{default_database_path, PasscodeConfig, PhotoConfig, VaultConfig};
pub use error::{Error, Result};
pub use lock::{AppLock, LifecycleEvent, LockEffect, LockState};
pub use logging::{init_json_logging, init_logging};
pub use navigation::{NavigationListener, NavigationStack};
pub use passcode::{
    DeferredAction, DeferredTicket, PasscodeEvent, PasscodeMode, PasscodePhase, PasscodeSession,
    Prompt,
};
pub use passcode_store::{PasscodeCheck, PasscodeStore};
pub use privacy::{CoverState, CoverSurface, PrivacyCover};
pub use scheduler::{DeferredQueue, ScheduleId};
pub use settings::{
    MemorySettingsBackend, Settings, SettingsBackend, DEFAULT_TIMEOUT_SECS, FIELD_LOCK_COUNT,
    TIMEOUT_OPTIONS,
};
pub use tag::TagColor;
pub use text::{derive_title, format_timestamp, is_not_blank};
