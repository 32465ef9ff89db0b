//! Bouncing single-LED animation on the active-low bar.

/// Register value at power-on: only the LED on bit 0 lit.
pub const POWER_ON_PATTERN: u8 = 0xFE;
/// Register value with every LED lit.
pub const ALL_LIT: u8 = 0x00;

const LEFT_END: u8 = 0x7F;
const RIGHT_END: u8 = 0xFE;

/// Mirror of the LED register plus the current sweep direction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LedAnimation {
    pattern: u8,
    rising: bool,
}

impl Default for LedAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl LedAnimation {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pattern: POWER_ON_PATTERN,
            rising: true,
        }
    }

    #[must_use]
    pub const fn pattern(&self) -> u8 {
        self.pattern
    }

    /// Advances one step and returns the new register value.
    ///
    /// Shifting fills the vacated bit with a one, so after a freeze the bar
    /// sweeps back into a single lit LED within one pass.
    pub fn step(&mut self) -> u8 {
        if self.rising {
            self.pattern = (self.pattern << 1) | 0x01;
            if self.pattern == LEFT_END {
                self.rising = false;
            }
        } else {
            self.pattern = (self.pattern >> 1) | 0x80;
            if self.pattern == RIGHT_END {
                self.rising = true;
            }
        }
        self.pattern
    }

    /// Lights every LED. The sweep direction is kept.
    pub fn freeze(&mut self) -> u8 {
        self.pattern = ALL_LIT;
        self.pattern
    }
}
