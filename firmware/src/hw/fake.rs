//! Host fakes for the `embedded-hal` traits the drivers consume.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, I2c, Operation, SevenBitAddress};

const WIRES: usize = 16;
const RS: usize = 0;

#[derive(Default)]
struct BusState {
    levels: [bool; WIRES],
    enable: Option<usize>,
    data_start: usize,
    latched: Vec<(bool, u8)>,
    writes: usize,
}

/// Shared set of wires. Cloned handles observe the same levels.
#[derive(Clone, Default)]
pub struct Bus(Rc<RefCell<BusState>>);

impl Bus {
    /// Bus that latches a nibble from `data_start..data_start + 4` (tagged
    /// with wire 0 as RS) on every falling edge of `enable`.
    pub fn new(enable: usize, data_start: usize) -> Self {
        let bus = Self::default();
        {
            let mut state = bus.0.borrow_mut();
            state.enable = Some(enable);
            state.data_start = data_start;
        }
        bus
    }

    pub fn wire(&self, index: usize) -> Wire {
        Wire {
            index,
            bus: self.clone(),
        }
    }

    pub fn set(&self, index: usize, level: bool) {
        let mut state = self.0.borrow_mut();
        let was_high = state.levels[index];
        state.levels[index] = level;
        state.writes += 1;

        if state.enable == Some(index) && was_high && !level {
            let start = state.data_start;
            let nibble = (0..4).fold(0u8, |acc, bit| {
                acc | (u8::from(state.levels[start + bit]) << bit)
            });
            let rs = state.levels[RS];
            state.latched.push((rs, nibble));
        }
    }

    pub fn level(&self, index: usize) -> bool {
        self.0.borrow().levels[index]
    }

    pub fn latched(&self) -> Vec<(bool, u8)> {
        self.0.borrow().latched.clone()
    }

    pub fn writes(&self) -> usize {
        self.0.borrow().writes
    }
}

pub struct Wire {
    index: usize,
    bus: Bus,
}

impl digital::ErrorType for Wire {
    type Error = Infallible;
}

impl OutputPin for Wire {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.bus.set(self.index, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.bus.set(self.index, true);
        Ok(())
    }
}

impl InputPin for Wire {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bus.level(self.index))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bus.level(self.index))
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Register-file I2C target answering at one address.
#[derive(Default)]
pub struct FakeI2c {
    pub address: SevenBitAddress,
    pub registers: [u8; 4],
    pub writes: Vec<Vec<u8>>,
    pub failing: bool,
    pointer: usize,
}

impl FakeI2c {
    pub fn new(address: SevenBitAddress) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }
}

impl i2c::ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.failing || address != self.address {
            return Err(ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Address));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    if let Some(&register) = bytes.first() {
                        self.pointer = usize::from(register);
                    }
                    self.writes.push(bytes.to_vec());
                }
                Operation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        *byte = self.registers.get(self.pointer).copied().unwrap_or(0);
                        self.pointer += 1;
                    }
                }
            }
        }
        Ok(())
    }
}
