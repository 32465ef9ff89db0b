//! HD44780 character display driven over a 4-bit parallel bus.
//!
//! Only the write path is wired (R/W is tied low on the board), so the driver
//! waits fixed execution times instead of polling the busy flag.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use lock_core::peripherals::CharacterDisplay;

const CLEAR: u8 = 0x01;
const ENTRY_MODE_INCREMENT: u8 = 0x06;
const DISPLAY_ON: u8 = 0x0C;
const FUNCTION_SET_4BIT_2LINE: u8 = 0x28;
const SET_DDRAM_ADDRESS: u8 = 0x80;

/// Execution time of most instructions.
const COMMAND_US: u32 = 50;
/// Clear and home need much longer.
const CLEAR_US: u32 = 2_000;

pub struct Hd44780<P, T> {
    rs: P,
    enable: P,
    /// D4..D7, lowest bit first.
    data: [P; 4],
    delay: T,
}

impl<P: OutputPin, T: DelayNs> Hd44780<P, T> {
    pub fn new(rs: P, enable: P, data: [P; 4], delay: T) -> Self {
        Self {
            rs,
            enable,
            data,
            delay,
        }
    }

    /// Runs the power-on reset sequence that forces 4-bit mode, then sets two
    /// lines, display on without cursor, and left-to-right entry.
    ///
    /// # Errors
    ///
    /// Propagates the first pin error.
    pub fn init(&mut self) -> Result<(), P::Error> {
        self.delay.delay_ms(50);
        self.rs.set_low()?;
        self.enable.set_low()?;

        for wait_us in [4_500, 150, 150] {
            self.write_nibble(0x3)?;
            self.delay.delay_us(wait_us);
        }
        self.write_nibble(0x2)?;
        self.delay.delay_us(COMMAND_US);

        self.command(FUNCTION_SET_4BIT_2LINE)?;
        self.command(DISPLAY_ON)?;
        self.command(ENTRY_MODE_INCREMENT)?;
        self.command(CLEAR)?;
        self.delay.delay_us(CLEAR_US);
        Ok(())
    }

    fn command(&mut self, byte: u8) -> Result<(), P::Error> {
        self.rs.set_low()?;
        self.write_byte(byte)
    }

    fn data_byte(&mut self, byte: u8) -> Result<(), P::Error> {
        self.rs.set_high()?;
        self.write_byte(byte)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), P::Error> {
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)?;
        self.delay.delay_us(COMMAND_US);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), P::Error> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            if nibble & (1 << bit) == 0 {
                pin.set_low()?;
            } else {
                pin.set_high()?;
            }
        }
        self.enable.set_high()?;
        self.delay.delay_us(1);
        self.enable.set_low()?;
        self.delay.delay_us(1);
        Ok(())
    }
}

impl<P: OutputPin, T: DelayNs> CharacterDisplay for Hd44780<P, T> {
    type Error = P::Error;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.command(CLEAR)?;
        self.delay.delay_us(CLEAR_US);
        Ok(())
    }

    fn set_cursor(&mut self, address: u8) -> Result<(), Self::Error> {
        self.command(SET_DDRAM_ADDRESS | (address & 0x7F))
    }

    fn write_str(&mut self, text: &str) -> Result<(), Self::Error> {
        for byte in text.bytes() {
            self.data_byte(if byte.is_ascii() { byte } else { b'?' })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::fake::{Bus, NoDelay};

    const RS: usize = 0;
    const EN: usize = 1;

    fn display(bus: &Bus) -> Hd44780<crate::hw::fake::Wire, NoDelay> {
        Hd44780::new(
            bus.wire(RS),
            bus.wire(EN),
            [bus.wire(2), bus.wire(3), bus.wire(4), bus.wire(5)],
            NoDelay,
        )
    }

    /// Pairs latched nibbles into bytes, tagging each with the RS level.
    fn bytes(latched: &[(bool, u8)]) -> Vec<(bool, u8)> {
        latched
            .chunks(2)
            .map(|pair| (pair[0].0, (pair[0].1 << 4) | pair[1].1))
            .collect()
    }

    #[test]
    fn init_forces_four_bit_mode() {
        let bus = Bus::new(EN, 2);
        let mut lcd = display(&bus);
        lcd.init().unwrap();

        let latched = bus.latched();
        let nibbles: Vec<u8> = latched.iter().take(4).map(|(_, nibble)| *nibble).collect();
        assert_eq!(nibbles, [0x3, 0x3, 0x3, 0x2]);
        assert_eq!(
            bytes(&latched[4..]),
            [
                (false, FUNCTION_SET_4BIT_2LINE),
                (false, DISPLAY_ON),
                (false, ENTRY_MODE_INCREMENT),
                (false, CLEAR),
            ]
        );
    }

    #[test]
    fn cursor_and_text_use_command_and_data_registers() {
        let bus = Bus::new(EN, 2);
        let mut lcd = display(&bus);

        lcd.set_cursor(0x42).unwrap();
        lcd.write_str("7A").unwrap();

        assert_eq!(
            bytes(&bus.latched()),
            [(false, 0xC2), (true, b'7'), (true, b'A')]
        );
    }

    #[test]
    fn non_ascii_is_replaced() {
        let bus = Bus::new(EN, 2);
        let mut lcd = display(&bus);
        lcd.write_str("é").unwrap();

        assert!(bytes(&bus.latched()).iter().all(|&(rs, byte)| rs && byte == b'?'));
    }
}
