//! In-memory peripherals backing the emulator and the tests.
//!
//! Each device can be switched into a failing state to exercise the fault
//! reporting paths of the state machine.

use embedded_hal::delay::DelayNs;

use super::{
    Button, ButtonLevels, ButtonPanel, CharacterDisplay, LINE_ONE, LINE_TWO, LedBar, RangeFinder,
};

/// Error returned by a peripheral switched into its failing state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InjectedFault;

/// DDRAM cells per display line.
pub const LINE_CELLS: usize = 40;
/// Columns visible on a 16x2 module.
pub const VISIBLE_COLUMNS: usize = 16;

/// Two-line HD44780-style DDRAM model.
#[derive(Clone, Debug)]
pub struct MemoryDisplay {
    cells: [[u8; LINE_CELLS]; 2],
    address: u8,
    revision: u32,
    failing: bool,
}

impl Default for MemoryDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDisplay {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [[b' '; LINE_CELLS]; 2],
            address: LINE_ONE,
            revision: 0,
            failing: false,
        }
    }

    /// Makes every subsequent operation fail (or succeed again).
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Visible part of a line (`row` 0 or 1).
    #[must_use]
    pub fn line(&self, row: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|cells| core::str::from_utf8(&cells[..VISIBLE_COLUMNS]).ok())
            .unwrap_or_default()
    }

    /// Character stored at a DDRAM address, if the address exists.
    #[must_use]
    pub fn char_at(&self, address: u8) -> Option<char> {
        locate(address).map(|(row, column)| char::from(self.cells[row][column]))
    }

    /// Current write address.
    #[must_use]
    pub const fn cursor(&self) -> u8 {
        self.address
    }

    /// Counter bumped on every successful mutation.
    #[must_use]
    pub const fn revision(&self) -> u32 {
        self.revision
    }

    fn advance(&mut self) {
        self.address = match self.address {
            address if address == LINE_ONE + LINE_CELLS as u8 - 1 => LINE_TWO,
            address if address == LINE_TWO + LINE_CELLS as u8 - 1 => LINE_ONE,
            address => address + 1,
        };
    }
}

fn locate(address: u8) -> Option<(usize, usize)> {
    let cells = LINE_CELLS as u8;
    if (LINE_ONE..LINE_ONE + cells).contains(&address) {
        Some((0, usize::from(address - LINE_ONE)))
    } else if (LINE_TWO..LINE_TWO + cells).contains(&address) {
        Some((1, usize::from(address - LINE_TWO)))
    } else {
        None
    }
}

impl CharacterDisplay for MemoryDisplay {
    type Error = InjectedFault;

    fn clear(&mut self) -> Result<(), InjectedFault> {
        if self.failing {
            return Err(InjectedFault);
        }
        self.cells = [[b' '; LINE_CELLS]; 2];
        self.address = LINE_ONE;
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    fn set_cursor(&mut self, address: u8) -> Result<(), InjectedFault> {
        if self.failing || locate(address).is_none() {
            return Err(InjectedFault);
        }
        self.address = address;
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), InjectedFault> {
        if self.failing {
            return Err(InjectedFault);
        }
        for byte in text.bytes() {
            if let Some((row, column)) = locate(self.address) {
                self.cells[row][column] = if byte.is_ascii() { byte } else { b'?' };
            }
            self.advance();
        }
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }
}

/// Sonar returning whatever distance the test or operator dialled in.
#[derive(Clone, Debug, Default)]
pub struct MemorySonar {
    distance_cm: u16,
    range_register: Option<u8>,
    triggers: u32,
    failing: bool,
}

impl MemorySonar {
    #[must_use]
    pub const fn new(distance_cm: u16) -> Self {
        Self {
            distance_cm,
            range_register: None,
            triggers: 0,
            failing: false,
        }
    }

    pub fn set_distance(&mut self, distance_cm: u16) {
        self.distance_cm = distance_cm;
    }

    #[must_use]
    pub const fn distance(&self) -> u16 {
        self.distance_cm
    }

    /// Value last written to the range register.
    #[must_use]
    pub const fn range_register(&self) -> Option<u8> {
        self.range_register
    }

    /// Number of measurements started.
    #[must_use]
    pub const fn triggers(&self) -> u32 {
        self.triggers
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl RangeFinder for MemorySonar {
    type Error = InjectedFault;

    fn set_range_register(&mut self, value: u8) -> Result<(), InjectedFault> {
        if self.failing {
            return Err(InjectedFault);
        }
        self.range_register = Some(value);
        Ok(())
    }

    fn trigger(&mut self) -> Result<(), InjectedFault> {
        if self.failing {
            return Err(InjectedFault);
        }
        self.triggers = self.triggers.wrapping_add(1);
        Ok(())
    }

    fn read_distance(&mut self) -> Result<u16, InjectedFault> {
        if self.failing {
            Err(InjectedFault)
        } else {
            Ok(self.distance_cm)
        }
    }
}

/// Buttons held and released programmatically.
#[derive(Clone, Debug, Default)]
pub struct MemoryButtons {
    levels: ButtonLevels,
    failing: bool,
}

impl MemoryButtons {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            levels: ButtonLevels::RELEASED,
            failing: false,
        }
    }

    pub fn press(&mut self, button: Button) {
        self.set(button, true);
    }

    pub fn release(&mut self, button: Button) {
        self.set(button, false);
    }

    pub fn release_all(&mut self) {
        self.levels = ButtonLevels::RELEASED;
    }

    #[must_use]
    pub const fn levels(&self) -> ButtonLevels {
        self.levels
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn set(&mut self, button: Button, pressed: bool) {
        match button {
            Button::Confirm => self.levels.confirm = pressed,
            Button::Mode => self.levels.mode = pressed,
        }
    }
}

impl ButtonPanel for MemoryButtons {
    type Error = InjectedFault;

    fn sample(&mut self) -> Result<ButtonLevels, InjectedFault> {
        if self.failing {
            Err(InjectedFault)
        } else {
            Ok(self.levels)
        }
    }
}

/// LED register latch.
#[derive(Clone, Debug)]
pub struct MemoryLeds {
    pattern: u8,
    writes: u32,
    failing: bool,
}

impl Default for MemoryLeds {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLeds {
    /// Starts with every LED dark (active-low register all ones).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pattern: 0xFF,
            writes: 0,
            failing: false,
        }
    }

    #[must_use]
    pub const fn pattern(&self) -> u8 {
        self.pattern
    }

    /// Lit state per LED, bit 0 first.
    #[must_use]
    pub fn lit(&self) -> [bool; 8] {
        core::array::from_fn(|bit| self.pattern & (1 << bit) == 0)
    }

    #[must_use]
    pub const fn writes(&self) -> u32 {
        self.writes
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl LedBar for MemoryLeds {
    type Error = InjectedFault;

    fn write(&mut self, pattern: u8) -> Result<(), InjectedFault> {
        if self.failing {
            return Err(InjectedFault);
        }
        self.pattern = pattern;
        self.writes = self.writes.wrapping_add(1);
        Ok(())
    }
}

/// Delay that returns immediately and records how long it was asked to wait.
#[derive(Clone, Debug, Default)]
pub struct RecordingDelay {
    total_ns: u64,
}

impl RecordingDelay {
    #[must_use]
    pub const fn new() -> Self {
        Self { total_ns: 0 }
    }

    /// Total requested wait in nanoseconds.
    #[must_use]
    pub const fn total_ns(&self) -> u64 {
        self.total_ns
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns = self.total_ns.saturating_add(u64::from(ns));
    }
}

/// Board made only of in-memory peripherals.
pub type MemoryBoard =
    super::Board<MemoryDisplay, MemorySonar, MemoryButtons, MemoryLeds, RecordingDelay>;

/// Builds a [`MemoryBoard`] with the sonar reading `distance_cm`.
#[must_use]
pub const fn memory_board(distance_cm: u16) -> MemoryBoard {
    super::Board::new(
        MemoryDisplay::new(),
        MemorySonar::new(distance_cm),
        MemoryButtons::new(),
        MemoryLeds::new(),
        RecordingDelay::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_writes_land_on_addressed_line() {
        let mut display = MemoryDisplay::new();
        display.set_cursor(LINE_ONE).unwrap();
        display.write_str("PASSWORD").unwrap();
        display.set_cursor(LINE_TWO + 2).unwrap();
        display.write_str("____").unwrap();

        assert_eq!(display.line(0), "PASSWORD        ");
        assert_eq!(display.line(1), "  ____          ");
        assert_eq!(display.cursor(), LINE_TWO + 6);
        assert_eq!(display.char_at(LINE_TWO + 3), Some('_'));
        assert_eq!(display.char_at(0x30), None);
    }

    #[test]
    fn display_rejects_holes_in_address_space() {
        let mut display = MemoryDisplay::new();
        assert_eq!(display.set_cursor(0x28), Err(InjectedFault));
        assert_eq!(display.set_cursor(0x68), Err(InjectedFault));
        assert!(display.set_cursor(0x67).is_ok());
    }

    #[test]
    fn display_cursor_wraps_between_lines() {
        let mut display = MemoryDisplay::new();
        display.set_cursor(0x27).unwrap();
        display.write_str("ab").unwrap();
        assert_eq!(display.char_at(0x27), Some('a'));
        assert_eq!(display.char_at(LINE_TWO), Some('b'));
    }

    #[test]
    fn clear_blanks_and_homes() {
        let mut display = MemoryDisplay::new();
        display.set_cursor(LINE_TWO).unwrap();
        display.write_str("X").unwrap();
        let before = display.revision();
        display.clear().unwrap();

        assert_eq!(display.line(1), "                ");
        assert_eq!(display.cursor(), LINE_ONE);
        assert!(display.revision() > before);
    }

    #[test]
    fn failing_devices_report_faults() {
        let mut board = memory_board(10);
        board.display.set_failing(true);
        board.sonar.set_failing(true);
        board.buttons.set_failing(true);
        board.leds.set_failing(true);

        assert_eq!(board.display.clear(), Err(InjectedFault));
        assert_eq!(board.sonar.trigger(), Err(InjectedFault));
        assert_eq!(board.buttons.sample(), Err(InjectedFault));
        assert_eq!(board.leds.write(0), Err(InjectedFault));
    }

    #[test]
    fn leds_report_active_low_bits() {
        let mut leds = MemoryLeds::new();
        leds.write(0xFE).unwrap();
        let lit = leds.lit();
        assert!(lit[0]);
        assert!(lit[1..].iter().all(|on| !on));
    }

    #[test]
    fn delay_accumulates_requested_time() {
        let mut delay = RecordingDelay::new();
        delay.delay_ms(65);
        assert_eq!(delay.total_ns(), 65_000_000);
    }
}
