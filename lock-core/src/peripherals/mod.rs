//! Hardware seams of the access controller.
//!
//! The state machine only talks to the outside world through the traits in
//! this module. The firmware implements them on top of `embedded-hal` drivers;
//! the emulator and the tests use the in-memory versions from [`memory`].

use core::fmt;

use embedded_hal::delay::DelayNs;

pub mod memory;

/// DDRAM address of the first character of line one.
pub const LINE_ONE: u8 = 0x00;
/// DDRAM address of the first character of line two.
pub const LINE_TWO: u8 = 0x40;

/// Two-line character display addressed by raw DDRAM offsets.
pub trait CharacterDisplay {
    type Error;

    /// Blanks the display and homes the cursor.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Moves the write cursor to a DDRAM address.
    fn set_cursor(&mut self, address: u8) -> Result<(), Self::Error>;

    /// Writes ASCII text at the cursor, advancing it one cell per character.
    fn write_str(&mut self, text: &str) -> Result<(), Self::Error>;
}

/// Distance sensor used as the digit dial.
pub trait RangeFinder {
    type Error;

    /// Programs the maximum range register once at startup.
    fn set_range_register(&mut self, value: u8) -> Result<(), Self::Error>;

    /// Starts a measurement. The result is valid after the settle delay.
    fn trigger(&mut self) -> Result<(), Self::Error>;

    /// Reads back the last measurement in centimetres.
    fn read_distance(&mut self) -> Result<u16, Self::Error>;
}

/// The two push-buttons.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Button {
    /// Captures a digit into the password being entered.
    Confirm,
    /// Starts the password change, then captures its digits.
    Mode,
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Button::Confirm => f.write_str("confirm"),
            Button::Mode => f.write_str("mode"),
        }
    }
}

/// Debounce-free snapshot of both buttons; `true` means held down.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ButtonLevels {
    pub confirm: bool,
    pub mode: bool,
}

impl ButtonLevels {
    /// Both buttons up.
    pub const RELEASED: Self = Self {
        confirm: false,
        mode: false,
    };
}

/// Source of the confirm and mode button levels. Implementations resolve the
/// electrical polarity; callers only see "pressed" or "released".
pub trait ButtonPanel {
    type Error;

    fn sample(&mut self) -> Result<ButtonLevels, Self::Error>;
}

/// Eight-LED bar driven as a single active-low register.
pub trait LedBar {
    type Error;

    fn write(&mut self, pattern: u8) -> Result<(), Self::Error>;
}

/// Peripheral that reported an error during a task.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PeripheralFault {
    Display,
    Sonar,
    Buttons,
    Leds,
}

impl fmt::Display for PeripheralFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PeripheralFault::Display => "display",
            PeripheralFault::Sonar => "sonar",
            PeripheralFault::Buttons => "buttons",
            PeripheralFault::Leds => "leds",
        };
        f.write_str(label)
    }
}

/// Bundle of every peripheral the device drives.
pub trait Peripherals {
    type Display: CharacterDisplay;
    type Sonar: RangeFinder;
    type Buttons: ButtonPanel;
    type Leds: LedBar;
    type Delay: DelayNs;

    fn display(&mut self) -> &mut Self::Display;
    fn sonar(&mut self) -> &mut Self::Sonar;
    fn buttons(&mut self) -> &mut Self::Buttons;
    fn leds(&mut self) -> &mut Self::Leds;
    fn delay(&mut self) -> &mut Self::Delay;
}

/// Plain struct implementation of [`Peripherals`].
#[derive(Clone, Debug, Default)]
pub struct Board<D, S, B, L, T> {
    pub display: D,
    pub sonar: S,
    pub buttons: B,
    pub leds: L,
    pub delay: T,
}

impl<D, S, B, L, T> Board<D, S, B, L, T> {
    pub const fn new(display: D, sonar: S, buttons: B, leds: L, delay: T) -> Self {
        Self {
            display,
            sonar,
            buttons,
            leds,
            delay,
        }
    }
}

impl<D, S, B, L, T> Peripherals for Board<D, S, B, L, T>
where
    D: CharacterDisplay,
    S: RangeFinder,
    B: ButtonPanel,
    L: LedBar,
    T: DelayNs,
{
    type Display = D;
    type Sonar = S;
    type Buttons = B;
    type Leds = L;
    type Delay = T;

    fn display(&mut self) -> &mut D {
        &mut self.display
    }

    fn sonar(&mut self) -> &mut S {
        &mut self.sonar
    }

    fn buttons(&mut self) -> &mut B {
        &mut self.buttons
    }

    fn leds(&mut self) -> &mut L {
        &mut self.leds
    }

    fn delay(&mut self) -> &mut T {
        &mut self.delay
    }
}
