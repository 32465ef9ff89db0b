use crate::device::Device;
use crate::password::Digit;
use crate::peripherals::Peripherals;
use crate::scheduler::{Reschedule, Task};

/// Measures the dial distance and echoes the digit it maps to at the active
/// entry cursor, so the display tracks the hand until a button confirms it.
#[derive(Copy, Clone, Debug, Default)]
pub struct SensorTask;

impl<P: Peripherals> Task<Device<P>> for SensorTask {
    fn run(&mut self, device: &mut Device<P>) -> Reschedule {
        let period = device.config().poll_period;
        let cm_per_digit = device.config().cm_per_digit;

        let Some(distance) = device.measure() else {
            return Reschedule::After(period);
        };
        if let Some(address) = device.echo_address() {
            device.echo(address, Digit::from_distance(distance, cm_per_digit));
        }
        Reschedule::After(period)
    }
}
