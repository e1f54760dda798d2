//! Passcode entry state machine
//!
//! A [`PasscodeSession`] models one passcode entry surface. Digits are fed in
//! one at a time; the final digit locks input and asks the host to call
//! [`PasscodeSession::fire`] after the debounce delay, at which point the
//! entry is evaluated against the current phase:
//!
//! | mode     | phases                                                        |
//! |----------|---------------------------------------------------------------|
//! | `Add`    | first entry → confirm entry → saved                           |
//! | `Verify` | verify entry → confirmed                                      |
//! | `Delete` | verify entry → passcode removed                               |
//! | `Change` | old entry → first entry → confirm entry → saved               |
//!
//! Failed verifications share one counter per session. Reaching the limit
//! schedules a teardown of the surface; the counter is never persisted, so a
//! new session starts from zero. Confirmation mismatches in `Add`/`Change`
//! only reset to the first entry and do not count as failures.

use crate::config::PasscodeConfig;
use crate::error::Result;
use crate::passcode_store::{PasscodeCheck, PasscodeStore};
use crate::settings::Settings;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use zeroize::{Zeroize, Zeroizing};

/// Shown while the first-launch question has not been answered
pub const FIRST_LAUNCH_HINT: &str =
    "Please set a passcode.\nPasscode settings are required to use this app.";

/// Shown when the confirmation entry differs from the first entry
pub const MISMATCH_MESSAGE: &str = "Passcodes did not match. Try again.";

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// What the entry surface was opened for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasscodeMode {
    /// Set a passcode where none exists
    Add,
    /// Unlock with the stored passcode
    Verify,
    /// Replace the stored passcode
    Change,
    /// Remove the stored passcode
    Delete,
}

impl PasscodeMode {
    /// Mode used by the lock screen
    pub fn for_lock_screen(has_passcode: bool) -> Self {
        if has_passcode {
            PasscodeMode::Verify
        } else {
            PasscodeMode::Add
        }
    }

    /// Mode used by the "change passcode" setting
    pub fn for_settings_change(has_passcode: bool) -> Self {
        if has_passcode {
            PasscodeMode::Change
        } else {
            PasscodeMode::Add
        }
    }
}

/// Where a session is in its flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasscodePhase {
    /// New passcode, first pass
    AwaitingFirstEntry,
    /// New passcode, second pass
    AwaitingConfirmEntry,
    /// Change mode, checking the existing passcode
    AwaitingOldEntry,
    /// Verify/delete modes, checking the stored passcode
    AwaitingVerifyEntry,
    /// Flow completed successfully
    Confirmed,
    /// Torn down after too many failures
    Rejected,
}

impl PasscodePhase {
    /// Whether the session accepts no more input
    pub fn is_terminal(&self) -> bool {
        matches!(self, PasscodePhase::Confirmed | PasscodePhase::Rejected)
    }
}

/// Title shown above the digit fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Add mode, first pass
    EnterPasscode,
    /// Change mode, old passcode
    EnterOldPasscode,
    /// Verify and delete modes
    EnterYourPasscode,
    /// Change mode, new passcode first pass
    EnterNewPasscode,
    /// Add mode, second pass
    ReEnterPasscode,
    /// Change mode, new passcode second pass
    ReEnterNewPasscode,
}

impl Prompt {
    /// Display text
    pub fn text(&self) -> &'static str {
        match self {
            Prompt::EnterPasscode => "Enter Passcode",
            Prompt::EnterOldPasscode => "Enter your old passcode",
            Prompt::EnterYourPasscode => "Enter your passcode",
            Prompt::EnterNewPasscode => "Enter your new passcode",
            Prompt::ReEnterPasscode => "Re-enter your passcode",
            Prompt::ReEnterNewPasscode => "Re-enter your new passcode",
        }
    }
}

/// Message shown after `count` failed attempts
pub fn failed_attempt_message(count: u32) -> String {
    if count == 1 {
        "1 Passcode Failed Attempt".to_string()
    } else {
        format!("{} Passcode Failed Attempts", count)
    }
}

/// Deferred work a session asks the host to schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Evaluate the completed entry
    Evaluate,
    /// Tear down the surface after the final failure
    Teardown,
}

/// Token passed back to [`PasscodeSession::fire`]
///
/// Tickets from another session, or from before [`PasscodeSession::close`],
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredTicket {
    session: u64,
    generation: u64,
    action: DeferredAction,
}

impl DeferredTicket {
    /// Scheduled action
    pub fn action(&self) -> DeferredAction {
        self.action
    }
}

/// Signals emitted to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasscodeEvent {
    /// A digit was accepted
    DigitEntered {
        /// Digits now filled
        filled: usize,
    },
    /// A digit was removed
    DigitRemoved {
        /// Digits now filled
        filled: usize,
    },
    /// Run [`PasscodeSession::fire`] with `ticket` after `delay`
    Schedule {
        /// Ticket to fire
        ticket: DeferredTicket,
        /// Delay before firing
        delay: Duration,
    },
    /// Title changed
    PromptChanged(Prompt),
    /// All digit fields were emptied
    FieldsCleared,
    /// Confirmation entry did not match the first entry
    Mismatch,
    /// Verification failed
    FailedAttempt {
        /// Failures so far in this session
        count: u32,
    },
    /// New passcode stored from add mode
    PasscodeSaved,
    /// Stored passcode replaced from change mode
    PasscodeChanged,
    /// Stored passcode removed
    PasscodeRemoved,
    /// Unlock granted
    Confirmed,
    /// Ask whether to switch to biometric unlock
    BiometricUpsellRequested,
    /// Remove the entry surface
    Dismissed,
}

impl PasscodeEvent {
    /// Status text the surface should display for this event
    pub fn message(&self) -> Option<String> {
        match self {
            PasscodeEvent::Mismatch => Some(MISMATCH_MESSAGE.to_string()),
            PasscodeEvent::FailedAttempt { count } => Some(failed_attempt_message(*count)),
            _ => None,
        }
    }
}

/// One passcode entry surface
pub struct PasscodeSession {
    id: u64,
    generation: u64,
    mode: PasscodeMode,
    phase: PasscodePhase,
    store: PasscodeStore,
    config: PasscodeConfig,
    show_hint: bool,
    buffer: Zeroizing<String>,
    candidate: Option<Zeroizing<String>>,
    failed_attempts: u32,
    evaluation_pending: bool,
    teardown_pending: bool,
    closed: bool,
}

impl std::fmt::Debug for PasscodeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasscodeSession")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("phase", &self.phase)
            .field("filled", &self.buffer.len())
            .field("failed_attempts", &self.failed_attempts)
            .field("closed", &self.closed)
            .finish()
    }
}

impl PasscodeSession {
    /// Open a new entry surface
    pub fn new(mode: PasscodeMode, settings: Settings, config: PasscodeConfig) -> Self {
        let phase = match mode {
            PasscodeMode::Add => PasscodePhase::AwaitingFirstEntry,
            PasscodeMode::Change => PasscodePhase::AwaitingOldEntry,
            PasscodeMode::Verify | PasscodeMode::Delete => PasscodePhase::AwaitingVerifyEntry,
        };
        let show_hint = !settings.first_launch_acknowledged();
        let store = PasscodeStore::new(settings, config.hash_new_passcodes);
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(session = id, ?mode, "Passcode session opened");

        Self {
            id,
            generation: 0,
            mode,
            phase,
            store,
            buffer: Zeroizing::new(String::with_capacity(config.length)),
            config,
            show_hint,
            candidate: None,
            failed_attempts: 0,
            evaluation_pending: false,
            teardown_pending: false,
            closed: false,
        }
    }

    /// Session mode
    pub fn mode(&self) -> PasscodeMode {
        self.mode
    }

    /// Current phase
    pub fn phase(&self) -> PasscodePhase {
        self.phase
    }

    /// Title for the current phase; `None` once finished
    pub fn prompt(&self) -> Option<Prompt> {
        let creating_new = self.mode == PasscodeMode::Change;
        match self.phase {
            PasscodePhase::AwaitingFirstEntry if creating_new => Some(Prompt::EnterNewPasscode),
            PasscodePhase::AwaitingFirstEntry => Some(Prompt::EnterPasscode),
            PasscodePhase::AwaitingConfirmEntry if creating_new => {
                Some(Prompt::ReEnterNewPasscode)
            }
            PasscodePhase::AwaitingConfirmEntry => Some(Prompt::ReEnterPasscode),
            PasscodePhase::AwaitingOldEntry => Some(Prompt::EnterOldPasscode),
            PasscodePhase::AwaitingVerifyEntry => Some(Prompt::EnterYourPasscode),
            PasscodePhase::Confirmed | PasscodePhase::Rejected => None,
        }
    }

    /// First-launch hint, if it should be shown
    pub fn hint(&self) -> Option<&'static str> {
        self.show_hint.then_some(FIRST_LAUNCH_HINT)
    }

    /// Digits currently entered
    pub fn filled(&self) -> usize {
        self.buffer.len()
    }

    /// Failed verifications in this session
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Whether digit input is currently ignored
    pub fn is_input_locked(&self) -> bool {
        self.closed || self.evaluation_pending || self.teardown_pending || self.phase.is_terminal()
    }

    /// Whether the surface is gone
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Feed one character; anything but an ASCII digit is ignored
    pub fn push_digit(&mut self, digit: char) -> Vec<PasscodeEvent> {
        if self.is_input_locked() || !digit.is_ascii_digit() {
            return Vec::new();
        }
        if self.buffer.len() >= self.config.length {
            return Vec::new();
        }

        self.buffer.push(digit);
        let filled = self.buffer.len();
        let mut events = vec![PasscodeEvent::DigitEntered { filled }];

        if filled == self.config.length {
            self.evaluation_pending = true;
            events.push(PasscodeEvent::Schedule {
                ticket: self.ticket(DeferredAction::Evaluate),
                delay: self.config.debounce(),
            });
        }
        events
    }

    /// Remove the last digit
    pub fn delete_digit(&mut self) -> Vec<PasscodeEvent> {
        if self.is_input_locked() || self.buffer.pop().is_none() {
            return Vec::new();
        }
        vec![PasscodeEvent::DigitRemoved {
            filled: self.buffer.len(),
        }]
    }

    /// Run deferred work previously requested through [`PasscodeEvent::Schedule`]
    pub fn fire(&mut self, ticket: DeferredTicket) -> Result<Vec<PasscodeEvent>> {
        if ticket.session != self.id || ticket.generation != self.generation || self.closed {
            tracing::debug!(session = self.id, ?ticket, "Ignoring stale passcode callback");
            return Ok(Vec::new());
        }

        match ticket.action {
            DeferredAction::Evaluate if self.evaluation_pending => {
                self.evaluation_pending = false;
                self.evaluate()
            }
            DeferredAction::Teardown if self.teardown_pending => {
                self.teardown_pending = false;
                self.phase = PasscodePhase::Rejected;
                self.finish();
                tracing::info!(
                    session = self.id,
                    attempts = self.failed_attempts,
                    "Passcode entry torn down after failed attempts"
                );
                Ok(vec![PasscodeEvent::Dismissed])
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Close the surface; pending callbacks become no-ops
    pub fn close(&mut self) {
        if !self.closed {
            tracing::debug!(session = self.id, "Passcode session closed");
        }
        self.finish();
    }

    fn finish(&mut self) {
        self.closed = true;
        self.generation += 1;
        self.evaluation_pending = false;
        self.teardown_pending = false;
        self.buffer.zeroize();
        self.candidate = None;
    }

    fn ticket(&self, action: DeferredAction) -> DeferredTicket {
        DeferredTicket {
            session: self.id,
            generation: self.generation,
            action,
        }
    }

    fn take_entry(&mut self) -> Zeroizing<String> {
        std::mem::replace(
            &mut self.buffer,
            Zeroizing::new(String::with_capacity(self.config.length)),
        )
    }

    fn evaluate(&mut self) -> Result<Vec<PasscodeEvent>> {
        let entry = self.take_entry();

        match self.phase {
            PasscodePhase::AwaitingFirstEntry => {
                self.candidate = Some(entry);
                self.phase = PasscodePhase::AwaitingConfirmEntry;
                Ok(self.prompt_events())
            }
            PasscodePhase::AwaitingConfirmEntry => self.confirm_new(entry),
            PasscodePhase::AwaitingOldEntry => {
                if self.store.check(&entry)? == PasscodeCheck::Match {
                    self.phase = PasscodePhase::AwaitingFirstEntry;
                    tracing::debug!(session = self.id, "Old passcode verified");
                    Ok(self.prompt_events())
                } else {
                    Ok(self.register_failure())
                }
            }
            PasscodePhase::AwaitingVerifyEntry => {
                if self.store.check(&entry)? != PasscodeCheck::Match {
                    return Ok(self.register_failure());
                }
                let mut events = Vec::new();
                if self.mode == PasscodeMode::Delete {
                    self.store.remove()?;
                    events.push(PasscodeEvent::PasscodeRemoved);
                } else {
                    events.push(PasscodeEvent::Confirmed);
                }
                self.phase = PasscodePhase::Confirmed;
                self.finish();
                events.push(PasscodeEvent::Dismissed);
                tracing::info!(session = self.id, mode = ?self.mode, "Passcode accepted");
                Ok(events)
            }
            PasscodePhase::Confirmed | PasscodePhase::Rejected => Ok(Vec::new()),
        }
    }

    fn confirm_new(&mut self, entry: Zeroizing<String>) -> Result<Vec<PasscodeEvent>> {
        let matches = self
            .candidate
            .as_ref()
            .is_some_and(|c| c.as_str() == entry.as_str());

        if !matches {
            self.candidate = None;
            self.phase = PasscodePhase::AwaitingFirstEntry;
            tracing::debug!(session = self.id, "Passcode confirmation mismatch");
            let mut events = vec![PasscodeEvent::Mismatch];
            events.extend(self.prompt_events());
            return Ok(events);
        }

        self.store.save(&entry)?;
        let mut events = Vec::new();
        if self.mode == PasscodeMode::Change {
            events.push(PasscodeEvent::PasscodeChanged);
        } else {
            events.push(PasscodeEvent::PasscodeSaved);
            events.push(PasscodeEvent::Confirmed);
        }
        if self.show_hint {
            events.push(PasscodeEvent::BiometricUpsellRequested);
        }
        self.phase = PasscodePhase::Confirmed;
        self.finish();
        events.push(PasscodeEvent::Dismissed);
        Ok(events)
    }

    fn prompt_events(&self) -> Vec<PasscodeEvent> {
        let mut events = vec![PasscodeEvent::FieldsCleared];
        if let Some(prompt) = self.prompt() {
            events.push(PasscodeEvent::PromptChanged(prompt));
        }
        events
    }

    fn register_failure(&mut self) -> Vec<PasscodeEvent> {
        self.failed_attempts += 1;
        let count = self.failed_attempts;
        tracing::warn!(session = self.id, count, "Passcode verification failed");

        let mut events = vec![PasscodeEvent::FailedAttempt { count }];
        if count >= self.config.max_failed_attempts {
            self.teardown_pending = true;
            events.push(PasscodeEvent::Schedule {
                ticket: self.ticket(DeferredAction::Teardown),
                delay: self.config.teardown(),
            });
        } else {
            events.push(PasscodeEvent::FieldsCleared);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_config() -> PasscodeConfig {
        PasscodeConfig {
            hash_new_passcodes: false,
            ..Default::default()
        }
    }

    fn enter(session: &mut PasscodeSession, code: &str) -> Vec<PasscodeEvent> {
        let mut ticket = None;
        for c in code.chars() {
            for event in session.push_digit(c) {
                if let PasscodeEvent::Schedule { ticket: t, .. } = event {
                    ticket = Some(t);
                }
            }
        }
        let ticket = ticket.expect("entry did not complete");
        session.fire(ticket).unwrap()
    }

    fn teardown_ticket(events: &[PasscodeEvent]) -> Option<DeferredTicket> {
        events.iter().find_map(|e| match e {
            PasscodeEvent::Schedule { ticket, .. }
                if ticket.action() == DeferredAction::Teardown =>
            {
                Some(*ticket)
            }
            _ => None,
        })
    }

    #[test]
    fn test_non_digits_are_ignored() {
        let mut session =
            PasscodeSession::new(PasscodeMode::Add, Settings::in_memory(), plain_config());
        assert!(session.push_digit('a').is_empty());
        assert!(session.push_digit(' ').is_empty());
        assert_eq!(session.push_digit('4'), vec![PasscodeEvent::DigitEntered { filled: 1 }]);
        assert_eq!(session.filled(), 1);
    }

    #[test]
    fn test_sixth_digit_schedules_evaluation_and_locks_input() {
        let mut session =
            PasscodeSession::new(PasscodeMode::Add, Settings::in_memory(), plain_config());
        for c in "12345".chars() {
            session.push_digit(c);
        }
        let events = session.push_digit('6');

        assert!(matches!(
            events.last(),
            Some(PasscodeEvent::Schedule { delay, ticket })
                if *delay == Duration::from_millis(250)
                    && ticket.action() == DeferredAction::Evaluate
        ));
        assert!(session.is_input_locked());
        assert!(session.push_digit('7').is_empty());
        assert!(session.delete_digit().is_empty());
    }

    #[test]
    fn test_delete_digit() {
        let mut session =
            PasscodeSession::new(PasscodeMode::Verify, Settings::in_memory(), plain_config());
        assert!(session.delete_digit().is_empty());
        session.push_digit('1');
        session.push_digit('2');
        assert_eq!(session.delete_digit(), vec![PasscodeEvent::DigitRemoved { filled: 1 }]);
    }

    #[test]
    fn test_add_flow_saves_and_confirms() {
        let settings = Settings::in_memory();
        let mut session = PasscodeSession::new(PasscodeMode::Add, settings.clone(), plain_config());
        assert_eq!(session.prompt(), Some(Prompt::EnterPasscode));
        assert_eq!(session.hint(), Some(FIRST_LAUNCH_HINT));

        let events = enter(&mut session, "135790");
        assert_eq!(session.phase(), PasscodePhase::AwaitingConfirmEntry);
        assert!(events.contains(&PasscodeEvent::PromptChanged(Prompt::ReEnterPasscode)));

        let events = enter(&mut session, "135790");
        assert_eq!(
            events,
            vec![
                PasscodeEvent::PasscodeSaved,
                PasscodeEvent::Confirmed,
                PasscodeEvent::BiometricUpsellRequested,
                PasscodeEvent::Dismissed,
            ]
        );
        assert_eq!(session.phase(), PasscodePhase::Confirmed);
        assert_eq!(settings.main_passcode().as_deref().map(String::as_str), Some("135790"));
    }

    #[test]
    fn test_upsell_suppressed_after_first_launch() {
        let settings = Settings::in_memory();
        settings.set_first_launch_acknowledged(true).unwrap();
        let mut session = PasscodeSession::new(PasscodeMode::Add, settings, plain_config());
        assert_eq!(session.hint(), None);

        enter(&mut session, "000000");
        let events = enter(&mut session, "000000");

        assert!(!events.contains(&PasscodeEvent::BiometricUpsellRequested));
        assert!(events.contains(&PasscodeEvent::Confirmed));
    }

    #[test]
    fn test_add_mismatch_returns_to_first_entry() {
        let settings = Settings::in_memory();
        let mut session = PasscodeSession::new(PasscodeMode::Add, settings.clone(), plain_config());

        enter(&mut session, "111111");
        let events = enter(&mut session, "222222");

        assert_eq!(events[0], PasscodeEvent::Mismatch);
        assert_eq!(events[0].message().as_deref(), Some(MISMATCH_MESSAGE));
        assert!(events.contains(&PasscodeEvent::PromptChanged(Prompt::EnterPasscode)));
        assert_eq!(session.phase(), PasscodePhase::AwaitingFirstEntry);
        assert_eq!(session.failed_attempts(), 0);
        assert!(!settings.has_main_passcode());
    }

    #[test]
    fn test_verify_success_confirms_once() {
        let settings = Settings::in_memory();
        settings.set_main_passcode("424242").unwrap();
        let mut session = PasscodeSession::new(PasscodeMode::Verify, settings, plain_config());

        let events = enter(&mut session, "424242");

        assert_eq!(events, vec![PasscodeEvent::Confirmed, PasscodeEvent::Dismissed]);
        assert!(session.is_closed());
    }

    #[test]
    fn test_failed_attempt_messages_and_teardown() {
        let settings = Settings::in_memory();
        settings.set_main_passcode("424242").unwrap();
        let mut session = PasscodeSession::new(PasscodeMode::Verify, settings, plain_config());

        let first = enter(&mut session, "000000");
        assert_eq!(
            first,
            vec![PasscodeEvent::FailedAttempt { count: 1 }, PasscodeEvent::FieldsCleared]
        );
        assert_eq!(first[0].message().as_deref(), Some("1 Passcode Failed Attempt"));

        let second = enter(&mut session, "000001");
        assert_eq!(second[0].message().as_deref(), Some("2 Passcode Failed Attempts"));

        let third = enter(&mut session, "000002");
        assert_eq!(third[0], PasscodeEvent::FailedAttempt { count: 3 });
        assert_eq!(third[0].message().as_deref(), Some("3 Passcode Failed Attempts"));
        let ticket = teardown_ticket(&third).unwrap();
        assert!(session.is_input_locked());

        assert_eq!(session.fire(ticket).unwrap(), vec![PasscodeEvent::Dismissed]);
        assert_eq!(session.phase(), PasscodePhase::Rejected);
        assert!(session.fire(ticket).unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_passcode() {
        let settings = Settings::in_memory();
        settings.set_main_passcode("987654").unwrap();
        let mut session =
            PasscodeSession::new(PasscodeMode::Delete, settings.clone(), plain_config());

        let events = enter(&mut session, "987654");

        assert_eq!(events, vec![PasscodeEvent::PasscodeRemoved, PasscodeEvent::Dismissed]);
        assert!(!settings.has_main_passcode());
    }

    #[test]
    fn test_change_flow() {
        let settings = Settings::in_memory();
        settings.set_first_launch_acknowledged(true).unwrap();
        settings.set_main_passcode("111111").unwrap();
        let mut session =
            PasscodeSession::new(PasscodeMode::Change, settings.clone(), plain_config());
        assert_eq!(session.prompt(), Some(Prompt::EnterOldPasscode));

        let events = enter(&mut session, "111111");
        assert!(events.contains(&PasscodeEvent::PromptChanged(Prompt::EnterNewPasscode)));

        enter(&mut session, "222222");
        assert_eq!(session.prompt(), Some(Prompt::ReEnterNewPasscode));

        let mismatch = enter(&mut session, "333333");
        assert!(mismatch.contains(&PasscodeEvent::PromptChanged(Prompt::EnterNewPasscode)));

        enter(&mut session, "222222");
        let events = enter(&mut session, "222222");
        assert_eq!(events, vec![PasscodeEvent::PasscodeChanged, PasscodeEvent::Dismissed]);
        assert_eq!(settings.main_passcode().as_deref().map(String::as_str), Some("222222"));
    }

    #[test]
    fn test_change_old_entry_failures_count() {
        let settings = Settings::in_memory();
        settings.set_main_passcode("111111").unwrap();
        let mut session = PasscodeSession::new(PasscodeMode::Change, settings, plain_config());

        enter(&mut session, "999999");
        enter(&mut session, "999998");
        let third = enter(&mut session, "999997");

        assert!(teardown_ticket(&third).is_some());
        assert_eq!(session.phase(), PasscodePhase::AwaitingOldEntry);
    }

    #[test]
    fn test_close_invalidates_pending_evaluation() {
        let settings = Settings::in_memory();
        settings.set_main_passcode("424242").unwrap();
        let mut session = PasscodeSession::new(PasscodeMode::Verify, settings, plain_config());
        let mut ticket = None;
        for c in "424242".chars() {
            for event in session.push_digit(c) {
                if let PasscodeEvent::Schedule { ticket: t, .. } = event {
                    ticket = Some(t);
                }
            }
        }

        session.close();

        assert!(session.fire(ticket.unwrap()).unwrap().is_empty());
        assert_eq!(session.phase(), PasscodePhase::AwaitingVerifyEntry);
    }

    #[test]
    fn test_ticket_from_other_session_ignored() {
        let settings = Settings::in_memory();
        settings.set_main_passcode("424242").unwrap();
        let mut old = PasscodeSession::new(PasscodeMode::Verify, settings.clone(), plain_config());
        let mut ticket = None;
        for c in "424242".chars() {
            for event in old.push_digit(c) {
                if let PasscodeEvent::Schedule { ticket: t, .. } = event {
                    ticket = Some(t);
                }
            }
        }

        let mut fresh = PasscodeSession::new(PasscodeMode::Verify, settings, plain_config());
        assert!(fresh.fire(ticket.unwrap()).unwrap().is_empty());
        assert_eq!(fresh.failed_attempts(), 0);
    }

    #[test]
    fn test_hashed_add_then_verify() {
        let settings = Settings::in_memory();
        let mut add =
            PasscodeSession::new(PasscodeMode::Add, settings.clone(), PasscodeConfig::default());
        enter(&mut add, "802468");
        enter(&mut add, "802468");
        assert!(crate::passcode_store::is_hashed(&settings.main_passcode().unwrap()));

        let mut verify =
            PasscodeSession::new(PasscodeMode::Verify, settings, PasscodeConfig::default());
        assert!(enter(&mut verify, "802468").contains(&PasscodeEvent::Confirmed));
    }
}
