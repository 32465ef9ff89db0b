//! Operator console commands for driving the lock from a terminal.
//!
//! The grammar is line-oriented and case-insensitive. Parsing is kept in
//! `lock-core` so the command set is tested alongside the state machine it
//! drives; executing commands is up to the front-end.

use core::fmt;

use heapless::Vec;

use crate::password::Digit;
use crate::peripherals::Button;

pub mod catalog;
mod grammar;

pub use grammar::parse;

/// Most digits accepted by `enter` and `change`.
pub const MAX_DIGITS: usize = 8;

/// Digits typed after `enter` or `change`.
pub type DigitBuffer = Vec<Digit, MAX_DIGITS>;

/// Parsed console command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand<'a> {
    /// Set the simulated sonar distance in centimetres.
    Dial(u16),
    Press(Button),
    /// Release one button, or both when `None`.
    Release(Option<Button>),
    Tap(Button),
    /// Advance the scheduler by this many ticks.
    Run(u32),
    Enter(DigitBuffer),
    Change(DigitBuffer),
    Status,
    Help(Option<&'a str>),
    Exit,
}

/// Syntax error with the byte offset it was detected at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub offset: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax at {}", self.offset)
    }
}
