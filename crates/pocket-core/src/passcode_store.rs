//! Persistence and verification of the main passcode
//!
//! Passcodes written by older releases are stored as plain digits. New
//! passcodes are stored as Argon2id PHC strings when hashing is enabled, and
//! a plain passcode is re-stored hashed after its next successful check.

use crate::error::{Error, Result};
use crate::settings::Settings;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// PHC prefix identifying a hashed passcode
const PHC_PREFIX: &str = "$argon2";

/// Argon2id parameters: m_cost (KiB), t_cost, p_cost
const ARGON2_PARAMS: (u32, u32, u32) = (19456, 2, 1);

/// Outcome of checking an entry against the stored passcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasscodeCheck {
    /// Entry matches
    Match,
    /// Entry does not match
    Mismatch,
    /// No passcode is stored
    NotSet,
}

/// Main passcode persisted through [`Settings`]
#[derive(Debug, Clone)]
pub struct PasscodeStore {
    settings: Settings,
    hash_new_passcodes: bool,
}

impl PasscodeStore {
    /// Create a store; `hash_new_passcodes` controls the format of new writes
    pub fn new(settings: Settings, hash_new_passcodes: bool) -> Self {
        Self {
            settings,
            hash_new_passcodes,
        }
    }

    /// Whether a passcode is stored
    pub fn is_set(&self) -> bool {
        self.settings.has_main_passcode()
    }

    /// Persist `passcode` as the main passcode
    pub fn save(&self, passcode: &str) -> Result<()> {
        let stored = if self.hash_new_passcodes {
            hash_passcode(passcode)?
        } else {
            Zeroizing::new(passcode.to_string())
        };
        self.settings.set_main_passcode(&stored)?;
        tracing::info!(hashed = self.hash_new_passcodes, "Main passcode saved");
        Ok(())
    }

    /// Compare `entry` with the stored passcode
    pub fn check(&self, entry: &str) -> Result<PasscodeCheck> {
        let Some(stored) = self.settings.main_passcode() else {
            return Ok(PasscodeCheck::NotSet);
        };

        if is_hashed(&stored) {
            return Ok(if verify_hash(&stored, entry) {
                PasscodeCheck::Match
            } else {
                PasscodeCheck::Mismatch
            });
        }

        if !digest_eq(&stored, entry) {
            return Ok(PasscodeCheck::Mismatch);
        }

        if self.hash_new_passcodes {
            // A failed upgrade leaves the legacy value in place, which still verifies.
            match hash_passcode(entry) {
                Ok(hashed) => {
                    if let Err(e) = self.settings.set_main_passcode(&hashed) {
                        tracing::warn!(error = %e, "Failed to upgrade stored passcode");
                    } else {
                        tracing::info!("Upgraded legacy passcode to Argon2id");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to hash legacy passcode"),
            }
        }
        Ok(PasscodeCheck::Match)
    }

    /// Remove the stored passcode
    pub fn remove(&self) -> Result<()> {
        self.settings.remove_main_passcode()?;
        tracing::info!("Main passcode removed");
        Ok(())
    }
}

/// Whether a stored value is a PHC hash rather than plain digits
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with(PHC_PREFIX)
}

fn argon2() -> Result<Argon2<'static>> {
    let params = ParamsBuilder::new()
        .m_cost(ARGON2_PARAMS.0)
        .t_cost(ARGON2_PARAMS.1)
        .p_cost(ARGON2_PARAMS.2)
        .build()
        .map_err(|e| Error::Passcode(e.to_string()))?;
    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

fn hash_passcode(passcode: &str) -> Result<Zeroizing<String>> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()?
        .hash_password(passcode.as_bytes(), &salt)
        .map_err(|e| Error::Passcode(e.to_string()))?
        .to_string();
    Ok(Zeroizing::new(hash))
}

// An unreadable stored hash matches nothing.
fn verify_hash(stored: &str, entry: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Stored passcode hash is unreadable");
            return false;
        }
    };
    Argon2::default()
        .verify_password(entry.as_bytes(), &parsed)
        .is_ok()
}

fn digest_eq(a: &str, b: &str) -> bool {
    let da: [u8; 32] = Sha256::digest(a.as_bytes()).into();
    let db: [u8; 32] = Sha256::digest(b.as_bytes()).into();
    da == db
}
