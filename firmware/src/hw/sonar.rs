//! SRF08-compatible ultrasonic ranger on I2C.

use embedded_hal::i2c::{I2c, SevenBitAddress};
use lock_core::peripherals::RangeFinder;

/// Bus address of the ranger as fitted on the board.
pub const SONAR_ADDRESS: SevenBitAddress = 0x77;

const COMMAND_REGISTER: u8 = 0;
const RANGE_REGISTER: u8 = 2;
/// First echo high byte; the low byte follows.
const ECHO_REGISTER: u8 = 2;
const RANGE_IN_CENTIMETRES: u8 = 0x51;

pub struct Srf08<I> {
    bus: I,
    address: SevenBitAddress,
}

impl<I: I2c> Srf08<I> {
    pub fn new(bus: I) -> Self {
        Self::with_address(bus, SONAR_ADDRESS)
    }

    pub fn with_address(bus: I, address: SevenBitAddress) -> Self {
        Self { bus, address }
    }

    #[cfg(test)]
    fn bus(&mut self) -> &mut I {
        &mut self.bus
    }
}

impl<I: I2c> RangeFinder for Srf08<I> {
    type Error = I::Error;

    fn set_range_register(&mut self, value: u8) -> Result<(), Self::Error> {
        self.bus.write(self.address, &[RANGE_REGISTER, value])
    }

    fn trigger(&mut self) -> Result<(), Self::Error> {
        self.bus
            .write(self.address, &[COMMAND_REGISTER, RANGE_IN_CENTIMETRES])
    }

    fn read_distance(&mut self) -> Result<u16, Self::Error> {
        let mut echo = [0; 2];
        self.bus
            .write_read(self.address, &[ECHO_REGISTER], &mut echo)?;
        Ok(u16::from_be_bytes(echo))
    }
}
