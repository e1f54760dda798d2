//! Property-based tests for passcode entry, relock timing and settings encoding

use pocket_core::{
    AppLock, DeferredAction, ManualClock, MockAuthenticator, PasscodeConfig, PasscodeEvent,
    PasscodeMode, PasscodePhase, PasscodeSession, Settings,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn plain_config() -> PasscodeConfig {
    PasscodeConfig {
        hash_new_passcodes: false,
        ..Default::default()
    }
}

/// Type `code` and run every deferred callback the session asks for
fn enter(session: &mut PasscodeSession, code: &str) -> Vec<PasscodeEvent> {
    let mut pending = Vec::new();
    for c in code.chars() {
        pending.extend(session.push_digit(c));
    }
    let mut out = Vec::new();
    while let Some(event) = pending.first().cloned() {
        pending.remove(0);
        if let PasscodeEvent::Schedule { ticket, .. } = event {
            pending.extend(session.fire(ticket).unwrap());
        } else {
            out.push(event);
        }
    }
    out
}

fn code() -> impl Strategy<Value = String> {
    "[0-9]{6}"
}

proptest! {
    #[test]
    fn prop_add_stores_only_matching_entries(a in code(), b in code()) {
        let settings = Settings::in_memory();
        let mut session = PasscodeSession::new(PasscodeMode::Add, settings.clone(), plain_config());

        enter(&mut session, &a);
        let events = enter(&mut session, &b);

        if a == b {
            prop_assert!(events.contains(&PasscodeEvent::PasscodeSaved));
            prop_assert_eq!(settings.main_passcode().map(|p| p.to_string()), Some(a));
            prop_assert_eq!(session.phase(), PasscodePhase::Confirmed);
        } else {
            prop_assert!(events.contains(&PasscodeEvent::Mismatch));
            prop_assert!(!settings.has_main_passcode());
            prop_assert_eq!(session.phase(), PasscodePhase::AwaitingFirstEntry);
            prop_assert_eq!(session.failed_attempts(), 0);
        }
    }

    #[test]
    fn prop_wrong_entry_counts_one_failure(stored in code(), entry in code()) {
        prop_assume!(stored != entry);
        let settings = Settings::in_memory();
        settings.set_main_passcode(&stored).unwrap();
        let mut session = PasscodeSession::new(PasscodeMode::Verify, settings, plain_config());

        let events = enter(&mut session, &entry);

        prop_assert_eq!(session.failed_attempts(), 1);
        prop_assert!(events.contains(&PasscodeEvent::FailedAttempt { count: 1 }), "expected FailedAttempt {{ count: 1 }}");
        prop_assert!(!events.contains(&PasscodeEvent::Confirmed));
    }

    #[test]
    fn prop_third_failure_tears_down(
        stored in code(),
        entries in prop::collection::vec(code(), 3),
        mode in prop::sample::select(vec![
            PasscodeMode::Verify,
            PasscodeMode::Delete,
            PasscodeMode::Change,
        ]),
    ) {
        prop_assume!(entries.iter().all(|e| *e != stored));
        let settings = Settings::in_memory();
        settings.set_main_passcode(&stored).unwrap();
        let mut session = PasscodeSession::new(mode, settings.clone(), plain_config());

        let mut last = Vec::new();
        for entry in &entries {
            last = enter(&mut session, entry);
        }

        prop_assert!(last.contains(&PasscodeEvent::FailedAttempt { count: 3 }), "expected FailedAttempt {{ count: 3 }}");
        prop_assert!(last.contains(&PasscodeEvent::Dismissed));
        prop_assert_eq!(session.phase(), PasscodePhase::Rejected);
        prop_assert!(session.is_closed());
        prop_assert_eq!(settings.main_passcode().map(|p| p.to_string()), Some(stored));
    }

    #[test]
    fn prop_relock_only_past_timeout(index in 0i64..4, elapsed_ms in 0u64..200_000) {
        let settings = Settings::in_memory();
        settings.set_timeout_index(index).unwrap();
        let clock = Arc::new(ManualClock::new());
        let mut lock = AppLock::new(settings.clone(), plain_config(), clock.clone())
            .with_authenticator(Arc::new(MockAuthenticator::new()));

        lock.mark_background_entry();
        clock.advance(Duration::from_millis(elapsed_ms));

        prop_assert_eq!(
            lock.should_relock(),
            Duration::from_millis(elapsed_ms) > settings.timeout()
        );
    }

    #[test]
    fn prop_int_settings_round_trip(
        tab in any::<i64>(),
        sort in any::<i64>(),
        timeout in any::<i64>(),
    ) {
        let settings = Settings::in_memory();
        settings.set_selected_tab(tab).unwrap();
        settings.set_sort_option(sort).unwrap();
        settings.set_timeout_index(timeout).unwrap();

        prop_assert_eq!(settings.selected_tab(), tab);
        prop_assert_eq!(settings.sort_option(), sort);
        prop_assert_eq!(settings.timeout_index(), timeout);
    }

    #[test]
    fn prop_bool_settings_round_trip(
        use_password in any::<bool>(),
        blur in any::<bool>(),
        locks in any::<[bool; 4]>(),
    ) {
        let settings = Settings::in_memory();
        settings.set_use_password(use_password).unwrap();
        settings.set_image_blur(blur).unwrap();
        settings.set_default_field_locks(locks).unwrap();

        prop_assert_eq!(settings.use_password(), use_password);
        prop_assert_eq!(settings.image_blur(), blur);
        prop_assert_eq!(settings.default_field_locks(), locks);
    }
}

#[test]
fn teardown_ticket_is_the_only_pending_work_after_third_failure() {
    let settings = Settings::in_memory();
    settings.set_main_passcode("111111").unwrap();
    let mut session = PasscodeSession::new(PasscodeMode::Verify, settings, plain_config());

    enter(&mut session, "000000");
    enter(&mut session, "000000");

    let mut events = Vec::new();
    for c in "000000".chars() {
        events.extend(session.push_digit(c));
    }
    let evaluate = events
        .iter()
        .find_map(|e| match e {
            PasscodeEvent::Schedule { ticket, .. } => Some(*ticket),
            _ => None,
        })
        .unwrap();
    let events = session.fire(evaluate).unwrap();
    let teardown = events
        .iter()
        .find_map(|e| match e {
            PasscodeEvent::Schedule { ticket, delay } => Some((*ticket, *delay)),
            _ => None,
        })
        .unwrap();

    assert_eq!(teardown.0.action(), DeferredAction::Teardown);
    assert_eq!(teardown.1, Duration::from_millis(800));
    assert!(!events.contains(&PasscodeEvent::FieldsCleared));
    assert!(session.is_input_locked());
    assert!(session.push_digit('1').is_empty());
}
