//! Biometric gate
//!
//! The host implements [`BiometricAuthenticator`] on top of the platform
//! prompt (Face ID, Touch ID, fingerprint) with device-passcode fallback.
//! A process-wide authenticator can be registered for hosts that construct
//! the lock controller far from their platform glue.

use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

/// Reason shown in the system prompt
pub const AUTH_REASON: &str = "Open My Secret Pocket";

/// Title of the device-passcode fallback button
pub const FALLBACK_TITLE: &str = "Enter Passcode";

/// Biometric sensor kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometryKind {
    /// Face recognition
    Face,
    /// Fingerprint sensor
    Fingerprint,
    /// No sensor enrolled
    None,
}

/// What the device can authenticate with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiometricCapabilities {
    /// Enrolled sensor
    pub biometry: BiometryKind,
    /// Device passcode is configured
    pub device_passcode: bool,
}

impl BiometricCapabilities {
    /// Whether any system authentication is possible
    pub fn can_authenticate(&self) -> bool {
        self.biometry != BiometryKind::None || self.device_passcode
    }
}

/// Result of a system authentication prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiometricOutcome {
    /// User authenticated
    Success,
    /// Authentication failed
    Failed,
    /// User dismissed the prompt
    Cancelled,
    /// Neither biometrics nor a device passcode are available
    NotAvailable,
    /// Platform error
    Error(String),
}

impl BiometricOutcome {
    /// Whether access is granted
    pub fn is_success(&self) -> bool {
        matches!(self, BiometricOutcome::Success)
    }
}

/// Platform authentication prompt
pub trait BiometricAuthenticator: Send + Sync {
    /// Device capabilities
    fn capabilities(&self) -> BiometricCapabilities;

    /// Show the system prompt with a device-passcode fallback
    fn authenticate(&self, reason: &str, fallback_title: &str) -> BiometricOutcome;
}

static AUTHENTICATOR: OnceLock<RwLock<Option<Arc<dyn BiometricAuthenticator>>>> = OnceLock::new();

fn authenticator_slot() -> &'static RwLock<Option<Arc<dyn BiometricAuthenticator>>> {
    AUTHENTICATOR.get_or_init(|| RwLock::new(None))
}

/// Register the platform authenticator for this process.
pub fn set_biometric_authenticator(authenticator: Arc<dyn BiometricAuthenticator>) {
    *authenticator_slot().write() = Some(authenticator);
}

/// Clear the registered authenticator.
pub fn clear_biometric_authenticator() {
    *authenticator_slot().write() = None;
}

/// Get the registered authenticator, if any.
pub fn biometric_authenticator() -> Option<Arc<dyn BiometricAuthenticator>> {
    authenticator_slot().read().as_ref().map(Arc::clone)
}

/// Scriptable authenticator for tests and platforms without a sensor
pub struct MockAuthenticator {
    capabilities: BiometricCapabilities,
    outcome: RwLock<BiometricOutcome>,
    prompts: RwLock<Vec<String>>,
}

impl MockAuthenticator {
    /// Fingerprint device that always succeeds
    pub fn new() -> Self {
        Self::with_capabilities(BiometricCapabilities {
            biometry: BiometryKind::Fingerprint,
            device_passcode: true,
        })
    }

    /// Device with no sensor and no passcode
    pub fn unavailable() -> Self {
        let mock = Self::with_capabilities(BiometricCapabilities {
            biometry: BiometryKind::None,
            device_passcode: false,
        });
        mock.set_outcome(BiometricOutcome::NotAvailable);
        mock
    }

    /// Custom capabilities
    pub fn with_capabilities(capabilities: BiometricCapabilities) -> Self {
        Self {
            capabilities,
            outcome: RwLock::new(BiometricOutcome::Success),
            prompts: RwLock::new(Vec::new()),
        }
    }

    /// Outcome returned by the next prompts
    pub fn set_outcome(&self, outcome: BiometricOutcome) {
        *self.outcome.write() = outcome;
    }

    /// Reasons of every prompt shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().clone()
    }
}

impl Default for MockAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl BiometricAuthenticator for MockAuthenticator {
    fn capabilities(&self) -> BiometricCapabilities {
        self.capabilities
    }

    fn authenticate(&self, reason: &str, _fallback_title: &str) -> BiometricOutcome {
        self.prompts.write().push(reason.to_string());
        if !self.capabilities.can_authenticate() {
            return BiometricOutcome::NotAvailable;
        }
        self.outcome.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_prompts() {
        let mock = MockAuthenticator::new();
        assert!(mock.authenticate(AUTH_REASON, FALLBACK_TITLE).is_success());

        mock.set_outcome(BiometricOutcome::Cancelled);
        assert_eq!(mock.authenticate(AUTH_REASON, FALLBACK_TITLE), BiometricOutcome::Cancelled);
        assert_eq!(mock.prompts(), vec![AUTH_REASON.to_string(); 2]);
    }

    #[test]
    fn test_unavailable_device() {
        let mock = MockAuthenticator::unavailable();
        assert!(!mock.capabilities().can_authenticate());
        assert_eq!(mock.authenticate(AUTH_REASON, FALLBACK_TITLE), BiometricOutcome::NotAvailable);
    }

    #[test]
    fn test_device_passcode_only_can_authenticate() {
        let caps = BiometricCapabilities {
            biometry: BiometryKind::None,
            device_passcode: true,
        };
        assert!(caps.can_authenticate());
    }

    #[test]
    fn test_registration() {
        set_biometric_authenticator(Arc::new(MockAuthenticator::new()));
        assert!(biometric_authenticator().is_some());
        clear_biometric_authenticator();
        assert!(biometric_authenticator().is_none());
    }
}
