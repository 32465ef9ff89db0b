//! Console command table shared by the parser and the help output.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandTag {
    Dial,
    Press,
    Release,
    Tap,
    Run,
    Enter,
    Change,
    Status,
    Help,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub tag: CommandTag,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "dial",
        tag: CommandTag::Dial,
        usage: "dial <cm>",
        summary: "set the simulated sonar distance",
    },
    CommandSpec {
        name: "press",
        tag: CommandTag::Press,
        usage: "press confirm|mode",
        summary: "hold a button down",
    },
    CommandSpec {
        name: "release",
        tag: CommandTag::Release,
        usage: "release [confirm|mode]",
        summary: "release one button, or both",
    },
    CommandSpec {
        name: "tap",
        tag: CommandTag::Tap,
        usage: "tap confirm|mode",
        summary: "press and release a button, one poll period each",
    },
    CommandSpec {
        name: "run",
        tag: CommandTag::Run,
        usage: "run <n>[ms|s]",
        summary: "advance the scheduler by n ticks or seconds",
    },
    CommandSpec {
        name: "enter",
        tag: CommandTag::Enter,
        usage: "enter <digits>",
        summary: "dial and confirm each digit in turn",
    },
    CommandSpec {
        name: "change",
        tag: CommandTag::Change,
        usage: "change <digits>",
        summary: "dial each digit and capture it with the mode button",
    },
    CommandSpec {
        name: "status",
        tag: CommandTag::Status,
        usage: "status",
        summary: "show phase, display, LEDs and cursors",
    },
    CommandSpec {
        name: "help",
        tag: CommandTag::Help,
        usage: "help [command]",
        summary: "list commands or describe one",
    },
    CommandSpec {
        name: "exit",
        tag: CommandTag::Exit,
        usage: "exit",
        summary: "leave the emulator",
    },
    CommandSpec {
        name: "quit",
        tag: CommandTag::Exit,
        usage: "quit",
        summary: "leave the emulator",
    },
];

/// Looks a command up by name, ignoring ASCII case.
#[must_use]
pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}
