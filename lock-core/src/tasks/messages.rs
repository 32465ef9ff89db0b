use crate::device::{Device, ScreenId};
use crate::peripherals::Peripherals;
use crate::scheduler::{Reschedule, Task};

/// Paints one fixed screen, then parks until rearmed.
#[derive(Copy, Clone, Debug)]
pub struct MessageTask {
    screen: ScreenId,
}

impl MessageTask {
    #[must_use]
    pub const fn new(screen: ScreenId) -> Self {
        Self { screen }
    }

    #[must_use]
    pub const fn screen(&self) -> ScreenId {
        self.screen
    }
}

impl<P: Peripherals> Task<Device<P>> for MessageTask {
    fn run(&mut self, device: &mut Device<P>) -> Reschedule {
        device.paint(self.screen);
        Reschedule::Park
    }
}

/// Opens the change-password flow. Parked until the mode button wakes it.
#[derive(Copy, Clone, Debug, Default)]
pub struct ChangePasswordTask;

impl<P: Peripherals> Task<Device<P>> for ChangePasswordTask {
    fn run(&mut self, device: &mut Device<P>) -> Reschedule {
        device.paint(ScreenId::NewPassword);
        device.enter_change_password();
        device.freeze_leds();
        Reschedule::Park
    }
}
