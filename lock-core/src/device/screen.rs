use core::fmt;

use crate::peripherals::{LINE_ONE, LINE_TWO};

/// DDRAM address of the first digit echo on the entry screens.
pub const ECHO_ORIGIN: u8 = LINE_TWO + 2;

/// Named two-line screens.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScreenId {
    Welcome,
    Prompt,
    PasswordEntry,
    AccessGranted,
    AccessDenied,
    NewPassword,
    PasswordChanged,
    TimedOut,
}

/// Text and placement of one screen.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ScreenLayout {
    pub top: &'static str,
    pub bottom_at: u8,
    pub bottom: &'static str,
}

impl ScreenLayout {
    const fn lines(top: &'static str, bottom: &'static str) -> Self {
        Self {
            top,
            bottom_at: LINE_TWO,
            bottom,
        }
    }

    const fn entry(top: &'static str) -> Self {
        Self {
            top,
            bottom_at: ECHO_ORIGIN,
            bottom: "____",
        }
    }

    /// Address the top line is written at.
    #[must_use]
    pub const fn top_at(&self) -> u8 {
        LINE_ONE
    }
}

impl ScreenId {
    #[must_use]
    pub const fn layout(self) -> ScreenLayout {
        match self {
            ScreenId::Welcome => ScreenLayout::lines("WELCOME", "SONAR LOCK"),
            ScreenId::Prompt => ScreenLayout::lines("ENTER", "PASSWORD"),
            ScreenId::PasswordEntry => ScreenLayout::entry("PASSWORD"),
            ScreenId::AccessGranted => ScreenLayout::lines("ACCESS", "GRANTED"),
            ScreenId::AccessDenied => ScreenLayout::lines("PASSWORD", "WRONG"),
            ScreenId::NewPassword => ScreenLayout::entry("NEW PASS"),
            ScreenId::PasswordChanged => ScreenLayout::lines("PASSWORD", "CHANGED"),
            ScreenId::TimedOut => ScreenLayout::lines("TIME", "EXPIRED"),
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScreenId::Welcome => "welcome",
            ScreenId::Prompt => "prompt",
            ScreenId::PasswordEntry => "password-entry",
            ScreenId::AccessGranted => "access-granted",
            ScreenId::AccessDenied => "access-denied",
            ScreenId::NewPassword => "new-password",
            ScreenId::PasswordChanged => "password-changed",
            ScreenId::TimedOut => "timed-out",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_screens_leave_room_for_echoes() {
        for screen in [ScreenId::PasswordEntry, ScreenId::NewPassword] {
            let layout = screen.layout();
            assert_eq!(layout.bottom_at, ECHO_ORIGIN);
            assert_eq!(layout.bottom.len(), crate::password::PASSCODE_LEN);
        }
    }

    #[test]
    fn every_line_fits_sixteen_columns() {
        let all = [
            ScreenId::Welcome,
            ScreenId::Prompt,
            ScreenId::PasswordEntry,
            ScreenId::AccessGranted,
            ScreenId::AccessDenied,
            ScreenId::NewPassword,
            ScreenId::PasswordChanged,
            ScreenId::TimedOut,
        ];
        for screen in all {
            let layout = screen.layout();
            assert!(layout.top.len() <= 16, "{screen:?}");
            assert!(usize::from(layout.bottom_at - LINE_TWO) + layout.bottom.len() <= 16);
        }
    }
}
