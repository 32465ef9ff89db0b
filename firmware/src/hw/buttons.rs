use embedded_hal::digital::InputPin;
use lock_core::peripherals::{ButtonLevels, ButtonPanel};

/// Confirm and mode buttons wired to ground with pull-ups, so a held button
/// reads low.
pub struct ActiveLowButtons<P> {
    confirm: P,
    mode: P,
}

impl<P: InputPin> ActiveLowButtons<P> {
    pub fn new(confirm: P, mode: P) -> Self {
        Self { confirm, mode }
    }
}

impl<P: InputPin> ButtonPanel for ActiveLowButtons<P> {
    type Error = P::Error;

    fn sample(&mut self) -> Result<ButtonLevels, Self::Error> {
        Ok(ButtonLevels {
            confirm: self.confirm.is_low()?,
            mode: self.mode.is_low()?,
        })
    }
}
