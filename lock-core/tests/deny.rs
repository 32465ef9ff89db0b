mod support;

use lock_core::config::LockConfig;
use lock_core::device::{Outcome, Phase};
use lock_core::password::PasscodeEntry;
use lock_core::telemetry::LockEvent;

use support::{await_entry, booted, drain, enter, screen};

#[test]
fn wrong_last_digit_denies_and_resets() {
    let mut lock = booted(LockConfig::DEFAULT);
    drain(&mut lock);

    enter(&mut lock, "1112");

    assert_eq!(lock.last_outcome(), Some(Outcome::Denied));
    assert_eq!(lock.phase(), Phase::Entering);
    assert_eq!(lock.device().entry(), &PasscodeEntry::new());
    assert_eq!(screen(&lock), ("PASSWORD".into(), "WRONG".into()));

    let events = drain(&mut lock);
    let denied = events
        .iter()
        .position(|event| *event == LockEvent::AccessDenied)
        .expect("denied event");
    assert_eq!(events.get(denied + 1), Some(&LockEvent::Reset));
}

#[test]
fn entry_reopens_after_denial_and_can_succeed() {
    let mut lock = booted(LockConfig::DEFAULT);
    enter(&mut lock, "2111");
    assert_eq!(lock.last_outcome(), Some(Outcome::Denied));

    await_entry(&mut lock);
    assert_eq!(screen(&lock).0, "PASSWORD");
    assert!(!lock.device().leds_frozen());

    enter(&mut lock, "1111");
    assert_eq!(lock.phase(), Phase::Verified);
}

#[test]
fn reference_survives_failed_attempts() {
    let mut lock = booted(LockConfig::DEFAULT);
    for attempt in ["9999", "1211", "0000"] {
        enter(&mut lock, attempt);
        assert_eq!(lock.last_outcome(), Some(Outcome::Denied), "{attempt}");
        await_entry(&mut lock);
    }
    assert_eq!(lock.device().reference(), &LockConfig::DEFAULT.reference);
}
