//! Board drivers behind the `lock-core` peripheral traits.
//!
//! Drivers are generic over `embedded-hal` 1.0 so they build and test on the
//! host; the concrete Embassy types are only named on target.

mod buttons;
mod lcd;
mod leds;
mod sonar;

#[cfg(test)]
mod fake;

pub use buttons::ActiveLowButtons;
pub use lcd::Hd44780;
pub use leds::PinLedBar;
pub use sonar::{SONAR_ADDRESS, Srf08};

#[cfg(target_os = "none")]
pub use board::FirmwareBoard;

#[cfg(target_os = "none")]
mod board {
    use embassy_stm32::gpio::{Input, Output};
    use embassy_stm32::i2c::I2c;
    use embassy_stm32::mode::Blocking;
    use embassy_time::Delay;
    use lock_core::peripherals::Board;

    use super::{ActiveLowButtons, Hd44780, PinLedBar, Srf08};

    /// Every peripheral of the lock as wired on the STM32G0 board.
    pub type FirmwareBoard = Board<
        Hd44780<Output<'static>, Delay>,
        Srf08<I2c<'static, Blocking>>,
        ActiveLowButtons<Input<'static>>,
        PinLedBar<Output<'static>>,
        Delay,
    >;
}
