//! Shared device context.
//!
//! [`Device`] owns the peripherals and every piece of state the tasks share:
//! both passwords and their cursors, the mode flags, the last sonar reading,
//! the LED register and the timeout progress. Tasks borrow it mutably one at
//! a time through the scheduler, so no locking is involved.
//!
//! Peripheral errors never abort a task. They are converted into
//! [`PeripheralFault`]s, recorded in the event log and the task carries on.

use core::fmt;

use embedded_hal::delay::DelayNs;
use heapless::Deque;

use crate::config::LockConfig;
use crate::password::{Digit, PASSCODE_LEN, Passcode, PasscodeEntry};
use crate::peripherals::{
    ButtonLevels, ButtonPanel, CharacterDisplay, LedBar, PeripheralFault, Peripherals, RangeFinder,
};
use crate::scheduler::{Countdown, Rearm, RearmSource, Ticks};
use crate::tasks::TaskId;
use crate::telemetry::{EventLog, EventRecord, LockEvent};

mod led;
mod screen;

pub use led::{ALL_LIT, LedAnimation, POWER_ON_PATTERN};
pub use screen::{ECHO_ORIGIN, ScreenId, ScreenLayout};

const REARM_QUEUE: usize = 8;

/// Lock state as seen from outside, derived from the mode flags.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Welcome and prompt screens; entry has not opened yet.
    Welcome,
    /// Waiting for the four password digits.
    Entering,
    /// Password accepted. Terminal unless a password change is started.
    Verified,
    /// Collecting the replacement password.
    ChangingPassword,
    /// Entry window expired; the run loop has stopped.
    TimedOut,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Welcome => "welcome",
            Phase::Entering => "entering",
            Phase::Verified => "verified",
            Phase::ChangingPassword => "changing-password",
            Phase::TimedOut => "timed-out",
        };
        f.write_str(label)
    }
}

/// Result of the most recent completed attempt.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Granted,
    Denied,
    PasswordChanged,
    TimedOut,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Granted => "granted",
            Outcome::Denied => "denied",
            Outcome::PasswordChanged => "password-changed",
            Outcome::TimedOut => "timed-out",
        };
        f.write_str(label)
    }
}

/// Context handed to every task.
pub struct Device<P: Peripherals> {
    peripherals: P,
    config: LockConfig,
    reference: Passcode,
    entry: PasscodeEntry,
    new_cursor: usize,
    changing_password: bool,
    leds_frozen: bool,
    timeout_suspended: bool,
    timed_out: bool,
    entry_opened: bool,
    last_reading: Option<u16>,
    led_delay: Ticks,
    timeout_count: u8,
    leds: LedAnimation,
    screen: Option<ScreenId>,
    last_outcome: Option<Outcome>,
    rearms: Deque<Rearm, REARM_QUEUE>,
    events: EventLog,
    now: u64,
}

impl<P: Peripherals> Device<P> {
    pub fn new(peripherals: P, config: LockConfig) -> Self {
        Self {
            peripherals,
            reference: config.reference,
            entry: PasscodeEntry::new(),
            new_cursor: 0,
            changing_password: false,
            leds_frozen: false,
            timeout_suspended: false,
            timed_out: false,
            entry_opened: false,
            last_reading: None,
            led_delay: config.led_delay,
            timeout_count: 0,
            leds: LedAnimation::new(),
            screen: None,
            last_outcome: None,
            rearms: Deque::new(),
            events: EventLog::new(),
            now: 0,
            config,
        }
    }

    /// One-time hardware configuration: sonar range and initial LED pattern.
    pub fn configure(&mut self) -> Result<(), PeripheralFault> {
        let range = self.config.range_register();
        self.peripherals
            .sonar()
            .set_range_register(range)
            .map_err(|_| PeripheralFault::Sonar)?;
        let pattern = self.leds.pattern();
        self.peripherals
            .leds()
            .write(pattern)
            .map_err(|_| PeripheralFault::Leds)?;
        Ok(())
    }

    #[must_use]
    pub const fn config(&self) -> &LockConfig {
        &self.config
    }

    #[must_use]
    pub const fn peripherals(&self) -> &P {
        &self.peripherals
    }

    pub fn peripherals_mut(&mut self) -> &mut P {
        &mut self.peripherals
    }

    #[must_use]
    pub const fn reference(&self) -> &Passcode {
        &self.reference
    }

    #[must_use]
    pub const fn entry(&self) -> &PasscodeEntry {
        &self.entry
    }

    /// Next slot of the replacement password; [`PASSCODE_LEN`] when complete.
    #[must_use]
    pub const fn new_password_cursor(&self) -> usize {
        self.new_cursor
    }

    #[must_use]
    pub const fn is_changing_password(&self) -> bool {
        self.changing_password
    }

    #[must_use]
    pub const fn leds_frozen(&self) -> bool {
        self.leds_frozen
    }

    #[must_use]
    pub const fn timeout_suspended(&self) -> bool {
        self.timeout_suspended
    }

    #[must_use]
    pub const fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Raw distance of the latest successful measurement.
    #[must_use]
    pub const fn last_reading(&self) -> Option<u16> {
        self.last_reading
    }

    /// Digit the dial currently points at.
    #[must_use]
    pub const fn current_digit(&self) -> Option<Digit> {
        match self.last_reading {
            Some(distance) => Some(Digit::from_distance(distance, self.config.cm_per_digit)),
            None => None,
        }
    }

    #[must_use]
    pub const fn led_delay(&self) -> Ticks {
        self.led_delay
    }

    #[must_use]
    pub const fn led_pattern(&self) -> u8 {
        self.leds.pattern()
    }

    /// Timeout firings since the prompt, or since the last reset.
    #[must_use]
    pub const fn timeout_count(&self) -> u8 {
        self.timeout_count
    }

    /// Screen most recently painted.
    #[must_use]
    pub const fn screen(&self) -> Option<ScreenId> {
        self.screen
    }

    #[must_use]
    pub const fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.timed_out {
            Phase::TimedOut
        } else if self.changing_password {
            Phase::ChangingPassword
        } else if self.timeout_suspended {
            Phase::Verified
        } else if self.entry_opened {
            Phase::Entering
        } else {
            Phase::Welcome
        }
    }

    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// Removes the oldest pending event.
    pub fn pop_event(&mut self) -> Option<EventRecord> {
        self.events.pop()
    }

    /// Sets the tick stamp used for events recorded from now on.
    pub fn set_clock(&mut self, now: u64) {
        self.now = now;
    }

    pub(crate) fn record(&mut self, event: LockEvent) {
        self.events.record(self.now, event);
    }

    fn fault(&mut self, fault: PeripheralFault) {
        self.record(LockEvent::PeripheralFault(fault));
    }

    /// Clears the display and writes both lines of `screen`.
    pub(crate) fn paint(&mut self, screen: ScreenId) {
        self.screen = Some(screen);
        if screen == ScreenId::PasswordEntry {
            self.entry_opened = true;
        }

        let painted = draw(self.peripherals.display(), &screen.layout());
        match painted {
            Ok(()) => self.record(LockEvent::ScreenPainted(screen)),
            Err(_) => self.fault(PeripheralFault::Display),
        }
    }

    /// Writes a single digit at a DDRAM address.
    pub(crate) fn echo(&mut self, address: u8, digit: Digit) {
        let glyph = [digit.as_ascii()];
        let text = core::str::from_utf8(&glyph).unwrap_or("?");
        let display = self.peripherals.display();
        let written = display.set_cursor(address).and_then(|()| display.write_str(text));
        if written.is_err() {
            self.fault(PeripheralFault::Display);
        }
    }

    /// Address the live digit is echoed at, if any entry is open.
    #[must_use]
    pub fn echo_address(&self) -> Option<u8> {
        let cursor = if !self.entry.is_complete() {
            self.entry.cursor()
        } else if self.changing_password && self.new_cursor < PASSCODE_LEN {
            self.new_cursor
        } else {
            return None;
        };
        u8::try_from(cursor).ok().map(|offset| ECHO_ORIGIN + offset)
    }

    /// Triggers the sonar, waits for the echo and stores the reading.
    pub(crate) fn measure(&mut self) -> Option<u16> {
        let settle_us = u32::try_from(self.config.settle.as_micros()).unwrap_or(u32::MAX);
        let reading = match self.peripherals.sonar().trigger() {
            Ok(()) => {
                self.peripherals.delay().delay_us(settle_us);
                self.peripherals.sonar().read_distance().ok()
            }
            Err(_) => None,
        };
        if reading.is_none() {
            self.fault(PeripheralFault::Sonar);
        }
        self.last_reading = reading;
        reading
    }

    /// Samples both buttons. A failed sample reads as both released.
    pub(crate) fn sample_buttons(&mut self) -> ButtonLevels {
        match self.peripherals.buttons().sample() {
            Ok(levels) => levels,
            Err(_) => {
                self.fault(PeripheralFault::Buttons);
                ButtonLevels::RELEASED
            }
        }
    }

    /// Advances the LED sweep by one step.
    pub(crate) fn step_leds(&mut self) {
        let pattern = self.leds.step();
        self.write_leds(pattern);
    }

    /// Lights the whole bar and stops the sweep.
    pub(crate) fn freeze_leds(&mut self) {
        self.leds_frozen = true;
        let pattern = self.leds.freeze();
        self.write_leds(pattern);
    }

    fn write_leds(&mut self, pattern: u8) {
        if self.peripherals.leds().write(pattern).is_err() {
            self.fault(PeripheralFault::Leds);
        }
    }

    pub(crate) fn entry_mut(&mut self) -> &mut PasscodeEntry {
        &mut self.entry
    }

    /// Overwrites the next slot of the reference password. Returns the slot
    /// written and whether the replacement is now complete.
    pub(crate) fn store_new_digit(&mut self, digit: Digit) -> Option<(usize, bool)> {
        if self.new_cursor >= PASSCODE_LEN {
            return None;
        }
        let slot = self.new_cursor;
        self.reference.set(slot, digit);
        self.new_cursor += 1;
        Some((slot, self.new_cursor == PASSCODE_LEN))
    }

    pub(crate) fn enter_change_password(&mut self) {
        self.changing_password = true;
    }

    pub(crate) fn suspend_timeout(&mut self) {
        self.timeout_suspended = true;
    }

    /// Counts one timeout firing and returns the new total.
    pub(crate) fn bump_timeout(&mut self) -> u8 {
        self.timeout_count = self.timeout_count.saturating_add(1);
        self.timeout_count
    }

    pub(crate) fn set_led_delay(&mut self, delay: Ticks) {
        self.led_delay = delay;
    }

    pub(crate) fn mark_timed_out(&mut self) {
        self.timed_out = true;
    }

    pub(crate) fn set_outcome(&mut self, outcome: Outcome) {
        self.last_outcome = Some(outcome);
    }

    /// Queues a countdown overwrite for another task.
    pub(crate) fn rearm(&mut self, task: TaskId, countdown: Countdown) {
        // The queue is drained after every task run and no task queues more
        // than six requests.
        let _ = self.rearms.push_back(Rearm::new(task.slot(), countdown));
    }

    /// Returns every piece of entry state to its power-on value and rearms
    /// the entry tasks. The reference password is kept.
    ///
    /// Button edge memory lives in the button task and is not touched, so a
    /// button still held across a reset does not count as a new press.
    pub fn reset(&mut self) {
        self.timeout_suspended = false;
        self.leds_frozen = false;
        self.changing_password = false;
        self.new_cursor = 0;
        self.led_delay = self.config.led_delay;
        self.timeout_count = 0;
        self.entry.clear();
        self.last_reading = None;

        let input_start = Countdown::Armed(self.config.input_start);
        self.rearm(TaskId::Led, Countdown::Armed(self.led_delay));
        self.rearm(TaskId::EntryScreen, input_start);
        self.rearm(TaskId::Sensor, input_start);
        self.rearm(TaskId::Buttons, input_start);
        self.rearm(TaskId::Timeout, input_start);
        self.record(LockEvent::Reset);
    }
}

fn draw<D: CharacterDisplay>(display: &mut D, layout: &ScreenLayout) -> Result<(), D::Error> {
    display.clear()?;
    display.set_cursor(layout.top_at())?;
    display.write_str(layout.top)?;
    display.set_cursor(layout.bottom_at)?;
    display.write_str(layout.bottom)
}

impl<P: Peripherals> RearmSource for Device<P> {
    fn next_rearm(&mut self) -> Option<Rearm> {
        self.rearms.pop_front()
    }
}
