//! LED sweep and entry timeout.

use crate::device::{Device, Outcome, ScreenId};
use crate::peripherals::Peripherals;
use crate::scheduler::{Reschedule, Task};
use crate::telemetry::LockEvent;

/// Steps the LED bar at the current LED delay until frozen.
#[derive(Copy, Clone, Debug, Default)]
pub struct LedTask;

impl<P: Peripherals> Task<Device<P>> for LedTask {
    fn run(&mut self, device: &mut Device<P>) -> Reschedule {
        if device.leds_frozen() {
            return Reschedule::Park;
        }
        device.step_leds();
        Reschedule::After(device.led_delay())
    }
}

/// Bounds the entry window and speeds the LED sweep up as it runs out.
///
/// Each firing counts one step. Once `timeout_steps` firings have elapsed
/// the entry is closed, the timed-out screen shown and the run loop halted.
#[derive(Copy, Clone, Debug, Default)]
pub struct TimeoutTask;

impl<P: Peripherals> Task<Device<P>> for TimeoutTask {
    fn run(&mut self, device: &mut Device<P>) -> Reschedule {
        if device.timeout_suspended() {
            return Reschedule::Park;
        }

        let step = device.bump_timeout();
        let config = *device.config();
        if step >= config.timeout_steps {
            device.entry_mut().close();
            device.paint(ScreenId::TimedOut);
            device.freeze_leds();
            device.mark_timed_out();
            device.set_outcome(Outcome::TimedOut);
            device.record(LockEvent::TimedOut);
            return Reschedule::Halt;
        }

        let led_delay = config.led_delay_after(step);
        device.set_led_delay(led_delay);
        device.record(LockEvent::TimeoutStep { step, led_delay });
        Reschedule::After(config.timeout_period)
    }
}
