use embedded_hal::digital::OutputPin;
use lock_core::peripherals::LedBar;

/// Eight LEDs on individual pins, bit 0 first. A cleared bit lights its LED,
/// so each pin follows its bit directly.
pub struct PinLedBar<P> {
    pins: [P; 8],
}

impl<P: OutputPin> PinLedBar<P> {
    pub fn new(pins: [P; 8]) -> Self {
        Self { pins }
    }
}

impl<P: OutputPin> LedBar for PinLedBar<P> {
    type Error = P::Error;

    fn write(&mut self, pattern: u8) -> Result<(), Self::Error> {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            if pattern & (1 << bit) == 0 {
                pin.set_low()?;
            } else {
                pin.set_high()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::fake::Bus;

    #[test]
    fn pins_follow_pattern_bits() {
        let bus = Bus::default();
        let mut leds = PinLedBar::new(core::array::from_fn(|index| bus.wire(index)));

        leds.write(0xFE).unwrap();
        assert!(!bus.level(0));
        assert!((1..8).all(|index| bus.level(index)));

        leds.write(0x7F).unwrap();
        assert!((0..7).all(|index| bus.level(index)));
        assert!(!bus.level(7));
        assert_eq!(bus.writes(), 16);
    }
}
