//! Compile-time tunables for the access controller.
//!
//! All timings are expressed in scheduler ticks. The firmware advances the
//! scheduler once per millisecond, so one tick equals [`TICK`].

use core::time::Duration;

use crate::password::{Digit, Passcode};
use crate::scheduler::Ticks;

/// Wall-clock length of one scheduler tick.
pub const TICK: Duration = Duration::from_millis(1);

/// Reference password loaded at power-on.
pub const DEFAULT_PASSCODE: Passcode = Passcode::new([Digit::ONE; 4]);

/// Tunable parameters of the device.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LockConfig {
    /// Reference password at power-on. Only ever changed in memory afterwards.
    pub reference: Passcode,
    /// LED animation step delay before any timeout step elapsed.
    pub led_delay: Ticks,
    /// LED delay reduction applied per timeout step.
    pub led_speedup: Ticks,
    /// First countdown of the welcome screen task.
    pub welcome_at: Ticks,
    /// First countdown of the "enter password" prompt task.
    pub prompt_at: Ticks,
    /// First countdown of the password entry screen task.
    pub entry_screen_at: Ticks,
    /// First countdown of the sensor, button and timeout tasks, and their
    /// countdown after every reset.
    pub input_start: Ticks,
    /// Re-fire period of the sensor and button tasks.
    pub poll_period: Ticks,
    /// Re-fire period of the timeout task.
    pub timeout_period: Ticks,
    /// Timeout firings tolerated before the device locks out.
    pub timeout_steps: u8,
    /// Blocking wait between triggering the sonar and reading it back.
    pub settle: Duration,
    /// Maximum range programmed into the sonar at startup.
    pub max_range_cm: u16,
    /// Distance covered by one digit on the dial.
    pub cm_per_digit: u16,
}

impl LockConfig {
    /// Settings matching the reference hardware build.
    pub const DEFAULT: Self = Self {
        reference: DEFAULT_PASSCODE,
        led_delay: 300,
        led_speedup: 99,
        welcome_at: 0,
        prompt_at: 1_000,
        entry_screen_at: 2_000,
        input_start: 2_000,
        poll_period: 10,
        timeout_period: 10_000,
        timeout_steps: 3,
        settle: Duration::from_millis(65),
        max_range_cm: 150,
        cm_per_digit: 5,
    };

    /// Overrides the power-on reference password.
    #[must_use]
    pub const fn with_reference(mut self, reference: Passcode) -> Self {
        self.reference = reference;
        self
    }

    /// Overrides the initial LED delay and the per-step speed-up.
    #[must_use]
    pub const fn with_led_timing(mut self, delay: Ticks, speedup: Ticks) -> Self {
        self.led_delay = delay;
        self.led_speedup = speedup;
        self
    }

    /// Overrides the timeout period and the number of tolerated steps.
    #[must_use]
    pub const fn with_timeout(mut self, period: Ticks, steps: u8) -> Self {
        self.timeout_period = period;
        self.timeout_steps = steps;
        self
    }

    /// Overrides the sonar settle delay.
    #[must_use]
    pub const fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// LED delay after `steps` timeout firings.
    #[must_use]
    pub const fn led_delay_after(&self, steps: u8) -> Ticks {
        self.led_delay
            .saturating_sub(self.led_speedup.saturating_mul(steps as Ticks))
    }

    /// Distance that maps onto the centre of `digit` on the dial.
    #[must_use]
    pub const fn distance_for(&self, digit: Digit) -> u16 {
        (digit.value() as u16).saturating_mul(self.cm_per_digit)
    }

    /// Value written to the sonar range register for [`Self::max_range_cm`].
    ///
    /// The sonar counts range in 43 mm steps offset by 85 mm.
    #[must_use]
    pub const fn range_register(&self) -> u8 {
        let millimetres = (self.max_range_cm as u32) * 10;
        let steps = millimetres.saturating_sub(85) / 43 + 1;
        if steps > u8::MAX as u32 {
            u8::MAX
        } else {
            steps as u8
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn led_delay_shrinks_per_timeout_step() {
        let config = LockConfig::DEFAULT;
        assert_eq!(config.led_delay_after(0), 300);
        assert_eq!(config.led_delay_after(1), 201);
        assert_eq!(config.led_delay_after(2), 102);
        assert_eq!(config.led_delay_after(3), 3);
        assert_eq!(config.led_delay_after(9), 0);
    }

    #[test]
    fn range_register_matches_150cm() {
        assert_eq!(LockConfig::DEFAULT.range_register(), 33);
    }

    #[test]
    fn builders_override_single_fields() {
        let reference = Passcode::new([Digit::TWO; 4]);
        let config = LockConfig::DEFAULT
            .with_reference(reference)
            .with_timeout(500, 2)
            .with_settle(Duration::ZERO);

        assert_eq!(config.reference, reference);
        assert_eq!(config.timeout_period, 500);
        assert_eq!(config.timeout_steps, 2);
        assert_eq!(config.settle, Duration::ZERO);
        assert_eq!(config.poll_period, LockConfig::DEFAULT.poll_period);
    }
}
