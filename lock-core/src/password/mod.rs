//! Password digits, codes and entry cursors.

use core::fmt;

/// Number of digits in a password.
pub const PASSCODE_LEN: usize = 4;

/// A single dial digit in `0..=9`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Digit(u8);

impl Digit {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);
    pub const NINE: Self = Self(9);

    /// Builds a digit, rejecting values above nine.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= 9 { Some(Self(value)) } else { None }
    }

    /// Parses an ASCII decimal digit.
    #[must_use]
    pub const fn from_ascii(byte: u8) -> Option<Self> {
        if byte.is_ascii_digit() {
            Some(Self(byte - b'0'))
        } else {
            None
        }
    }

    /// Maps a sonar distance onto the dial: `distance / cm_per_digit`,
    /// clamped to nine. A zero divisor pins the dial at nine.
    #[must_use]
    pub const fn from_distance(distance_cm: u16, cm_per_digit: u16) -> Self {
        if cm_per_digit == 0 {
            return Self::NINE;
        }
        let quotient = distance_cm / cm_per_digit;
        if quotient >= 9 {
            Self::NINE
        } else {
            Self(quotient as u8)
        }
    }

    /// Numeric value of the digit.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// ASCII representation.
    #[must_use]
    pub const fn as_ascii(self) -> u8 {
        b'0' + self.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A complete four-digit password.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Passcode([Digit; PASSCODE_LEN]);

impl Passcode {
    /// Wraps four digits.
    #[must_use]
    pub const fn new(digits: [Digit; PASSCODE_LEN]) -> Self {
        Self(digits)
    }

    /// Parses exactly four ASCII digits.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != PASSCODE_LEN {
            return None;
        }
        let mut digits = [Digit::ZERO; PASSCODE_LEN];
        for (slot, byte) in digits.iter_mut().zip(bytes) {
            *slot = Digit::from_ascii(*byte)?;
        }
        Some(Self(digits))
    }

    /// Digits in entry order.
    #[must_use]
    pub const fn digits(&self) -> &[Digit; PASSCODE_LEN] {
        &self.0
    }

    /// Overwrites a single slot. Indices past the end are ignored.
    pub fn set(&mut self, slot: usize, digit: Digit) {
        if let Some(target) = self.0.get_mut(slot) {
            *target = digit;
        }
    }
}

impl fmt::Display for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in &self.0 {
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

/// Compares two passwords digit by digit; every position must match.
#[must_use]
pub fn check(entered: &[Digit; PASSCODE_LEN], reference: &[Digit; PASSCODE_LEN]) -> bool {
    entered.iter().zip(reference).all(|(a, b)| a == b)
}

/// Progress after pushing a digit into a [`PasscodeEntry`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EntryProgress {
    /// Digit stored in `slot`; more digits are expected.
    Stored { slot: usize },
    /// Digit stored in the last slot; the entry is now complete.
    Complete(Passcode),
    /// The entry was already complete; the digit was dropped.
    Full,
}

/// Password being typed in, slot by slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub struct PasscodeEntry {
    slots: [Option<Digit>; PASSCODE_LEN],
    cursor: usize,
}

impl PasscodeEntry {
    /// Empty entry with the cursor on the first slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None; PASSCODE_LEN],
            cursor: 0,
        }
    }

    /// Index of the next slot to fill; [`PASSCODE_LEN`] once complete.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns `true` once no more digits are accepted.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.cursor >= PASSCODE_LEN
    }

    /// Slot contents; unfilled slots are `None`.
    #[must_use]
    pub const fn slots(&self) -> &[Option<Digit>; PASSCODE_LEN] {
        &self.slots
    }

    /// Stores `digit` in the next free slot.
    pub fn push(&mut self, digit: Digit) -> EntryProgress {
        if self.is_complete() {
            return EntryProgress::Full;
        }
        let slot = self.cursor;
        self.slots[slot] = Some(digit);
        self.cursor += 1;

        match self.passcode() {
            Some(code) if self.is_complete() => EntryProgress::Complete(code),
            _ => EntryProgress::Stored { slot },
        }
    }

    /// Moves the cursor to the end without filling the remaining slots.
    /// Used to stop any further entry.
    pub fn close(&mut self) {
        self.cursor = PASSCODE_LEN;
    }

    /// The entered password, once every slot holds a digit.
    #[must_use]
    pub fn passcode(&self) -> Option<Passcode> {
        let mut digits = [Digit::ZERO; PASSCODE_LEN];
        for (target, slot) in digits.iter_mut().zip(&self.slots) {
            *target = (*slot)?;
        }
        Some(Passcode(digits))
    }

    /// Clears every slot and rewinds the cursor.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
