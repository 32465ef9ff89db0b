//! Observable transitions of the access controller.
//!
//! Tasks record [`LockEvent`]s into the device's [`EventLog`] as they run.
//! Front-ends drain the log after every tick: the firmware forwards records to
//! `defmt`, the emulator prints them and appends them to transcripts. The log
//! is bounded; when it overflows the oldest record is discarded and counted.

use core::fmt;

use heapless::Deque;

use crate::device::ScreenId;
use crate::password::Digit;
use crate::peripherals::PeripheralFault;
use crate::scheduler::Ticks;

/// Records kept before the oldest ones are dropped.
pub const EVENT_LOG_CAPACITY: usize = 32;

/// Which password a captured digit was written into.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CaptureFlow {
    /// The password being verified.
    Entry,
    /// The replacement reference password.
    NewPassword,
}

impl fmt::Display for CaptureFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureFlow::Entry => f.write_str("entry"),
            CaptureFlow::NewPassword => f.write_str("new-password"),
        }
    }
}

/// Transition worth reporting to an operator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LockEvent {
    ScreenPainted(ScreenId),
    DigitCaptured {
        flow: CaptureFlow,
        slot: usize,
        digit: Digit,
    },
    AccessGranted,
    AccessDenied,
    ChangePasswordArmed,
    PasswordChanged,
    TimeoutStep {
        step: u8,
        led_delay: Ticks,
    },
    TimedOut,
    Reset,
    PeripheralFault(PeripheralFault),
}

impl fmt::Display for LockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockEvent::ScreenPainted(screen) => write!(f, "screen {screen}"),
            LockEvent::DigitCaptured { flow, slot, digit } => {
                write!(f, "digit {flow} slot={slot} value={digit}")
            }
            LockEvent::AccessGranted => f.write_str("access-granted"),
            LockEvent::AccessDenied => f.write_str("access-denied"),
            LockEvent::ChangePasswordArmed => f.write_str("change-password-armed"),
            LockEvent::PasswordChanged => f.write_str("password-changed"),
            LockEvent::TimeoutStep { step, led_delay } => {
                write!(f, "timeout-step {step} led-delay={led_delay}")
            }
            LockEvent::TimedOut => f.write_str("timed-out"),
            LockEvent::Reset => f.write_str("reset"),
            LockEvent::PeripheralFault(fault) => write!(f, "fault {fault}"),
        }
    }
}

/// Event stamped with the scheduler tick it was recorded on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EventRecord {
    pub at: u64,
    pub event: LockEvent,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at, self.event)
    }
}

/// Bounded FIFO of [`EventRecord`]s.
#[derive(Clone, Debug)]
pub struct EventLog<const CAPACITY: usize = EVENT_LOG_CAPACITY> {
    records: Deque<EventRecord, CAPACITY>,
    dropped: u32,
}

impl<const CAPACITY: usize> Default for EventLog<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAPACITY: usize> EventLog<CAPACITY> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Deque::new(),
            dropped: 0,
        }
    }

    /// Appends a record, discarding the oldest one when full.
    pub fn record(&mut self, at: u64, event: LockEvent) {
        let record = EventRecord { at, event };
        if let Err(record) = self.records.push_back(record) {
            self.records.pop_front();
            self.dropped = self.dropped.saturating_add(1);
            // Cannot fail: a slot was just freed.
            let _ = self.records.push_back(record);
        }
    }

    /// Removes and returns the oldest record.
    pub fn pop(&mut self) -> Option<EventRecord> {
        self.records.pop_front()
    }

    /// Iterates pending records oldest first without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records discarded because the log was full.
    #[must_use]
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn events_render_in_kebab_case() {
        let captured = LockEvent::DigitCaptured {
            flow: CaptureFlow::NewPassword,
            slot: 2,
            digit: Digit::NINE,
        };
        assert_eq!(captured.to_string(), "digit new-password slot=2 value=9");
        assert_eq!(
            LockEvent::TimeoutStep {
                step: 1,
                led_delay: 201
            }
            .to_string(),
            "timeout-step 1 led-delay=201"
        );
        assert_eq!(
            LockEvent::ScreenPainted(ScreenId::AccessDenied).to_string(),
            "screen access-denied"
        );
        assert_eq!(
            LockEvent::PeripheralFault(PeripheralFault::Sonar).to_string(),
            "fault sonar"
        );
        assert_eq!(
            EventRecord {
                at: 42,
                event: LockEvent::Reset
            }
            .to_string(),
            "[42] reset"
        );
    }

    #[test]
    fn log_drains_in_order() {
        let mut log: EventLog<4> = EventLog::new();
        log.record(1, LockEvent::AccessDenied);
        log.record(2, LockEvent::Reset);

        assert_eq!(log.len(), 2);
        assert_eq!(log.pop().map(|r| r.event), Some(LockEvent::AccessDenied));
        assert_eq!(log.pop().map(|r| r.at), Some(2));
        assert!(log.pop().is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn full_log_drops_oldest_and_counts() {
        let mut log: EventLog<2> = EventLog::new();
        log.record(1, LockEvent::AccessDenied);
        log.record(2, LockEvent::Reset);
        log.record(3, LockEvent::TimedOut);

        assert_eq!(log.dropped(), 1);
        let stamps: std::vec::Vec<u64> = log.iter().map(|r| r.at).collect();
        assert_eq!(stamps, [2, 3]);
    }
}
