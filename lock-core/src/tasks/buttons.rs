//! Confirm and mode buttons: digit capture, verification and password change.
//!
//! Buttons act on rising edges only. The previous levels are stored on every
//! run whether or not an edge led to an action, so a held button produces a
//! single press.

use crate::device::{Device, Outcome, ScreenId};
use crate::password::{EntryProgress, PASSCODE_LEN, check};
use crate::peripherals::{ButtonLevels, Peripherals};
use crate::scheduler::{Countdown, Reschedule, Task};
use crate::telemetry::{CaptureFlow, LockEvent};

use super::TaskId;

#[derive(Copy, Clone, Debug, Default)]
pub struct ButtonTask {
    previous: ButtonLevels,
}

impl ButtonTask {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: ButtonLevels::RELEASED,
        }
    }

    /// Levels seen on the last run.
    #[must_use]
    pub const fn previous(&self) -> ButtonLevels {
        self.previous
    }
}

impl<P: Peripherals> Task<Device<P>> for ButtonTask {
    fn run(&mut self, device: &mut Device<P>) -> Reschedule {
        let period = device.config().poll_period;
        let levels = device.sample_buttons();
        let mode_pressed = levels.mode && !self.previous.mode;
        let confirm_pressed = levels.confirm && !self.previous.confirm;
        self.previous = levels;

        if mode_pressed && device.entry().is_complete() {
            on_mode(device);
        }
        if confirm_pressed {
            on_confirm(device);
        }
        Reschedule::After(period)
    }
}

fn on_mode<P: Peripherals>(device: &mut Device<P>) {
    if !device.is_changing_password() {
        device.rearm(TaskId::ChangePassword, Countdown::IMMEDIATE);
        device.record(LockEvent::ChangePasswordArmed);
        return;
    }

    let Some(digit) = device.current_digit() else {
        return;
    };
    let Some((slot, complete)) = device.store_new_digit(digit) else {
        return;
    };
    device.record(LockEvent::DigitCaptured {
        flow: CaptureFlow::NewPassword,
        slot,
        digit,
    });

    if complete {
        device.paint(ScreenId::PasswordChanged);
        device.freeze_leds();
        device.set_outcome(Outcome::PasswordChanged);
        device.record(LockEvent::PasswordChanged);
        device.reset();
    }
}

fn on_confirm<P: Peripherals>(device: &mut Device<P>) {
    let Some(digit) = device.current_digit() else {
        return;
    };

    let entered = match device.entry_mut().push(digit) {
        EntryProgress::Full => return,
        EntryProgress::Stored { slot } => {
            device.record(LockEvent::DigitCaptured {
                flow: CaptureFlow::Entry,
                slot,
                digit,
            });
            return;
        }
        EntryProgress::Complete(code) => code,
    };
    device.record(LockEvent::DigitCaptured {
        flow: CaptureFlow::Entry,
        slot: PASSCODE_LEN - 1,
        digit,
    });

    if check(entered.digits(), device.reference().digits()) {
        device.paint(ScreenId::AccessGranted);
        device.freeze_leds();
        device.suspend_timeout();
        device.set_outcome(Outcome::Granted);
        device.record(LockEvent::AccessGranted);
    } else {
        device.paint(ScreenId::AccessDenied);
        device.freeze_leds();
        device.set_outcome(Outcome::Denied);
        device.record(LockEvent::AccessDenied);
        device.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LockConfig;
    use crate::device::Phase;
    use crate::password::{Digit, Passcode};
    use crate::peripherals::Button;
    use crate::peripherals::memory::{MemoryBoard, memory_board};
    use crate::scheduler::RearmSource;

    fn device() -> Device<MemoryBoard> {
        let mut device = Device::new(memory_board(5), LockConfig::DEFAULT);
        device.measure();
        device
    }

    fn press(task: &mut ButtonTask, device: &mut Device<MemoryBoard>, button: Button) {
        device.peripherals_mut().buttons.press(button);
        task.run(device);
        device.peripherals_mut().buttons.release(button);
        task.run(device);
    }

    #[test]
    fn held_button_captures_once() {
        let mut device = device();
        let mut task = ButtonTask::new();
        device.peripherals_mut().buttons.press(Button::Confirm);

        for _ in 0..25 {
            task.run(&mut device);
        }

        assert_eq!(device.entry().cursor(), 1);
        assert_eq!(device.entry().slots()[0], Some(Digit::ONE));
        assert!(task.previous().confirm);
    }

    #[test]
    fn press_without_reading_is_ignored_but_remembered() {
        let mut device = Device::new(memory_board(5), LockConfig::DEFAULT);
        let mut task = ButtonTask::new();
        device.peripherals_mut().buttons.press(Button::Confirm);

        task.run(&mut device);
        assert_eq!(device.entry().cursor(), 0);

        device.measure();
        task.run(&mut device);
        assert_eq!(device.entry().cursor(), 0);
    }

    #[test]
    fn fourth_matching_digit_grants_access() {
        let mut device = device();
        let mut task = ButtonTask::new();
        for _ in 0..4 {
            press(&mut task, &mut device, Button::Confirm);
        }

        assert_eq!(device.phase(), Phase::Verified);
        assert_eq!(device.last_outcome(), Some(Outcome::Granted));
        assert!(device.leds_frozen());
        assert!(device.entry().is_complete());
        assert_eq!(device.next_rearm(), None);
    }

    #[test]
    fn mismatch_denies_and_resets() {
        let mut device = device();
        let mut task = ButtonTask::new();
        for _ in 0..3 {
            press(&mut task, &mut device, Button::Confirm);
        }
        device.peripherals_mut().sonar.set_distance(10);
        device.measure();
        press(&mut task, &mut device, Button::Confirm);

        assert_eq!(device.last_outcome(), Some(Outcome::Denied));
        assert_eq!(device.entry().cursor(), 0);
        assert_eq!(device.screen(), Some(ScreenId::AccessDenied));
        assert!(device.next_rearm().is_some());
    }

    #[test]
    fn mode_before_entry_complete_is_ignored() {
        let mut device = device();
        let mut task = ButtonTask::new();
        press(&mut task, &mut device, Button::Mode);

        assert_eq!(device.next_rearm(), None);
        assert!(!device.is_changing_password());
    }

    #[test]
    fn mode_after_grant_arms_change_then_captures_new_digits() {
        let mut device = device();
        let mut task = ButtonTask::new();
        for _ in 0..4 {
            press(&mut task, &mut device, Button::Confirm);
        }

        press(&mut task, &mut device, Button::Mode);
        let rearm = device.next_rearm().expect("change task armed");
        assert_eq!(rearm.slot, TaskId::ChangePassword.slot());
        assert_eq!(rearm.countdown, Countdown::IMMEDIATE);

        device.enter_change_password();
        device.peripherals_mut().sonar.set_distance(12);
        device.measure();
        for _ in 0..4 {
            press(&mut task, &mut device, Button::Mode);
        }

        assert_eq!(device.reference(), &Passcode::new([Digit::TWO; 4]));
        assert_eq!(device.last_outcome(), Some(Outcome::PasswordChanged));
        assert!(!device.is_changing_password());
        assert_eq!(device.new_password_cursor(), 0);
        assert_eq!(device.entry().cursor(), 0);
    }
}
