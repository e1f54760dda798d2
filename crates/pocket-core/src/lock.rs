//! App-lock controller
//!
//! Gates the main surface behind the passcode or the system biometric
//! prompt, re-locks after the configured timeout in the background, and
//! drives the privacy cover.
//!
//! ```text
//! Unlocked --resign--> CoverShown --active, within timeout--> Unlocked
//! CoverShown --active, timeout exceeded--> LockScreenPresented --success--> Unlocked
//! ```

use crate::biometric::{
    biometric_authenticator, BiometricAuthenticator, BiometricOutcome, AUTH_REASON,
    FALLBACK_TITLE,
};
use crate::clock::Clock;
use crate::config::PasscodeConfig;
use crate::error::Result;
use crate::passcode::{DeferredTicket, PasscodeEvent, PasscodeMode, PasscodeSession};
use crate::privacy::PrivacyCover;
use crate::scheduler::DeferredQueue;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Main surface usable
    Unlocked,
    /// App inactive, content covered
    CoverShown,
    /// Lock screen up, waiting for authentication
    LockScreenPresented,
}

/// Host lifecycle notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// App is about to lose focus (task switcher, incoming call)
    WillResignActive,
    /// App moved to the background
    DidEnterBackground,
    /// App is in the foreground and focused
    DidBecomeActive,
}

/// Things the host must render or do
#[derive(Debug, Clone, PartialEq)]
pub enum LockEffect {
    /// Raise the privacy cover
    CoverShown,
    /// Drop the privacy cover
    CoverHidden,
    /// Show the lock screen
    LockScreenPresented,
    /// Show the passcode entry surface
    PasscodeRequested {
        /// Mode of the new session
        mode: PasscodeMode,
    },
    /// Passcode surface update
    Passcode(PasscodeEvent),
    /// System prompt did not grant access
    BiometricFailed(BiometricOutcome),
    /// Ask whether to switch to biometric unlock
    BiometricUpsellRequested,
    /// Remove the lock screen
    Unlocked,
    /// Show the one-time help overlay
    HelpRequested,
}

/// App-lock controller
pub struct AppLock {
    settings: Settings,
    passcode_config: PasscodeConfig,
    clock: Arc<dyn Clock>,
    authenticator: Option<Arc<dyn BiometricAuthenticator>>,
    cover: PrivacyCover,
    state: LockState,
    background_entry: Option<Instant>,
    session: Option<PasscodeSession>,
    queue: DeferredQueue<DeferredTicket>,
}

impl AppLock {
    /// Create an unlocked controller; call [`AppLock::launch`] on cold start
    pub fn new(settings: Settings, passcode_config: PasscodeConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            passcode_config,
            clock,
            authenticator: None,
            cover: PrivacyCover::new(),
            state: LockState::Unlocked,
            background_entry: None,
            session: None,
            queue: DeferredQueue::new(),
        }
    }

    /// Use `authenticator` instead of the process-wide registration
    pub fn with_authenticator(mut self, authenticator: Arc<dyn BiometricAuthenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    fn authenticator(&self) -> Option<Arc<dyn BiometricAuthenticator>> {
        self.authenticator.clone().or_else(biometric_authenticator)
    }

    /// Current state
    pub fn state(&self) -> LockState {
        self.state
    }

    /// Whether the lock screen is up
    pub fn is_locked(&self) -> bool {
        self.state == LockState::LockScreenPresented
    }

    /// Privacy cover
    pub fn cover(&self) -> &PrivacyCover {
        &self.cover
    }

    /// Open passcode session on the lock screen
    pub fn session(&self) -> Option<&PasscodeSession> {
        self.session.as_ref()
    }

    /// When [`AppLock::pump`] next has work
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.next_due()
    }

    /// Cold start: the lock screen is always shown first
    pub fn launch(&mut self) -> Vec<LockEffect> {
        tracing::info!(use_password = self.settings.use_password(), "App launch, presenting lock");
        self.present_lock_screen()
    }

    /// Record the moment the app went to the background
    pub fn mark_background_entry(&mut self) {
        self.background_entry = Some(self.clock.now());
        tracing::debug!("Background entry recorded");
    }

    /// Whether the time spent in the background exceeds the timeout
    ///
    /// Clears the recorded entry when it returns true.
    pub fn should_relock(&mut self) -> bool {
        let Some(entered) = self.background_entry else {
            return false;
        };
        let elapsed = self.clock.now().saturating_duration_since(entered);
        let timeout = self.settings.timeout();
        if elapsed > timeout {
            self.background_entry = None;
            tracing::info!(
                elapsed_secs = elapsed.as_secs(),
                timeout_secs = timeout.as_secs(),
                "Background timeout exceeded"
            );
            true
        } else {
            false
        }
    }

    /// Feed a lifecycle notification
    pub fn handle_lifecycle(&mut self, event: LifecycleEvent) -> Vec<LockEffect> {
        match event {
            LifecycleEvent::WillResignActive => {
                self.cover.show();
                if self.state == LockState::Unlocked {
                    self.state = LockState::CoverShown;
                }
                vec![LockEffect::CoverShown]
            }
            LifecycleEvent::DidEnterBackground => {
                self.mark_background_entry();
                Vec::new()
            }
            LifecycleEvent::DidBecomeActive => {
                self.cover.hide();
                let mut effects = vec![LockEffect::CoverHidden];
                if self.should_relock() {
                    effects.extend(self.present_lock_screen());
                } else if self.state == LockState::CoverShown {
                    self.state = LockState::Unlocked;
                }
                effects
            }
        }
    }

    /// Show the lock screen unless it is already up
    pub fn present_lock_screen(&mut self) -> Vec<LockEffect> {
        if self.state == LockState::LockScreenPresented {
            tracing::debug!("Lock screen already presented");
            return Vec::new();
        }
        self.state = LockState::LockScreenPresented;
        let mut effects = vec![LockEffect::LockScreenPresented];
        effects.extend(self.request_unlock());
        effects
    }

    /// Start authentication ("tap to open")
    pub fn request_unlock(&mut self) -> Vec<LockEffect> {
        if self.state != LockState::LockScreenPresented {
            return Vec::new();
        }
        if self.settings.use_password() {
            return self.open_passcode_session();
        }

        let outcome = match self.authenticator() {
            Some(auth) => auth.authenticate(AUTH_REASON, FALLBACK_TITLE),
            None => BiometricOutcome::NotAvailable,
        };
        match outcome {
            BiometricOutcome::Success => self.unlock(),
            BiometricOutcome::NotAvailable => {
                tracing::warn!("Biometric unlock unavailable, falling back to passcode");
                let mut effects = vec![LockEffect::BiometricFailed(BiometricOutcome::NotAvailable)];
                effects.extend(self.open_passcode_session());
                effects
            }
            other => {
                tracing::debug!(outcome = ?other, "Biometric unlock not granted");
                vec![LockEffect::BiometricFailed(other)]
            }
        }
    }

    fn open_passcode_session(&mut self) -> Vec<LockEffect> {
        if self.session.as_ref().is_some_and(|s| !s.is_closed()) {
            return Vec::new();
        }
        let mode = PasscodeMode::for_lock_screen(self.settings.has_main_passcode());
        self.queue.clear();
        self.session = Some(PasscodeSession::new(
            mode,
            self.settings.clone(),
            self.passcode_config.clone(),
        ));
        vec![LockEffect::PasscodeRequested { mode }]
    }

    /// Forward a digit to the lock-screen passcode session
    pub fn push_digit(&mut self, digit: char) -> Vec<LockEffect> {
        let events = match self.session.as_mut() {
            Some(session) => session.push_digit(digit),
            None => return Vec::new(),
        };
        self.absorb(events)
    }

    /// Forward a backspace to the lock-screen passcode session
    pub fn delete_digit(&mut self) -> Vec<LockEffect> {
        let events = match self.session.as_mut() {
            Some(session) => session.delete_digit(),
            None => return Vec::new(),
        };
        self.absorb(events)
    }

    /// Close the passcode surface; the lock screen stays up
    pub fn close_passcode(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.close();
        }
        self.session = None;
        self.queue.clear();
    }

    /// Run deferred passcode work that is due
    ///
    /// A failed passcode write is logged and leaves the session waiting for
    /// new input; the remaining due work still runs.
    pub fn pump(&mut self) -> Vec<LockEffect> {
        let now = self.clock.now();
        let mut effects = Vec::new();
        for ticket in self.queue.take_due(now) {
            let events = match self.session.as_mut().map(|session| session.fire(ticket)) {
                Some(Ok(events)) => events,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, ?ticket, "Deferred passcode work failed");
                    continue;
                }
                None => continue,
            };
            effects.extend(self.absorb(events));
        }
        effects
    }

    fn absorb(&mut self, events: Vec<PasscodeEvent>) -> Vec<LockEffect> {
        let now = self.clock.now();
        let mut effects = Vec::new();
        let mut unlocked = false;
        for event in events {
            match event {
                PasscodeEvent::Schedule { ticket, delay } => {
                    self.queue.schedule(now, delay, ticket);
                }
                PasscodeEvent::Confirmed => {
                    effects.push(LockEffect::Passcode(PasscodeEvent::Confirmed));
                    unlocked = true;
                }
                PasscodeEvent::BiometricUpsellRequested => {
                    effects.push(LockEffect::BiometricUpsellRequested);
                }
                PasscodeEvent::Dismissed => {
                    self.session = None;
                    effects.push(LockEffect::Passcode(PasscodeEvent::Dismissed));
                }
                other => effects.push(LockEffect::Passcode(other)),
            }
        }
        if unlocked {
            effects.extend(self.unlock());
        }
        effects
    }

    fn unlock(&mut self) -> Vec<LockEffect> {
        self.state = LockState::Unlocked;
        self.background_entry = None;
        tracing::info!("App unlocked");

        let mut effects = vec![LockEffect::Unlocked];
        if !self.settings.help_shown() {
            effects.push(LockEffect::HelpRequested);
            if let Err(e) = self.settings.set_help_shown(true) {
                tracing::error!(error = %e, "Failed to record help overlay");
            }
        }
        effects
    }

    /// Apply the answer to the biometric upsell question
    ///
    /// Either answer acknowledges the first launch. Accepting runs the system
    /// prompt and switches to biometric unlock when the device supports it.
    pub fn resolve_biometric_upsell(&mut self, accept: bool) -> Result<Vec<LockEffect>> {
        let mut effects = Vec::new();
        if accept {
            let auth = self.authenticator();
            let outcome = match auth.as_ref() {
                Some(a) => a.authenticate(AUTH_REASON, FALLBACK_TITLE),
                None => BiometricOutcome::NotAvailable,
            };
            let supported = auth.is_some_and(|a| a.capabilities().can_authenticate());
            if outcome.is_success() && self.state == LockState::LockScreenPresented {
                effects.extend(self.unlock());
            } else if !outcome.is_success() {
                effects.push(LockEffect::BiometricFailed(outcome));
            }
            if supported {
                self.settings.set_use_password(false)?;
                tracing::info!("Switched to biometric unlock");
            }
        }
        self.settings.set_first_launch_acknowledged(true)?;
        Ok(effects)
    }

    /// Force passcode mode when the device has no biometrics and no passcode
    ///
    /// Returns whether the biometric option can be offered.
    pub fn sync_biometric_availability(&self) -> Result<bool> {
        let available = self
            .authenticator()
            .is_some_and(|a| a.capabilities().can_authenticate());
        if !available {
            self.settings.set_use_password(true)?;
            tracing::info!("Biometric option disabled, passcode mode forced");
        }
        Ok(available)
    }

    /// Time in the background so far, if recorded
    pub fn background_elapsed(&self) -> Option<Duration> {
        self.background_entry
            .map(|entered| self.clock.now().saturating_duration_since(entered))
    }
}
