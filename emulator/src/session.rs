use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use lock_core::config::LockConfig;
use lock_core::console::catalog::{self, COMMANDS};
use lock_core::console::{self, ConsoleCommand, DigitBuffer};
use lock_core::controller::LockController;
use lock_core::password::Passcode;
use lock_core::peripherals::Button;
use lock_core::peripherals::memory::{MemoryBoard, memory_board};
use lock_core::scheduler::TickOutcome;

/// Scripted sessions replayed by `capture-transcripts`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TranscriptProfile {
    Grant,
    Deny,
    Change,
    Timeout,
}

impl TranscriptProfile {
    pub const ALL: [Self; 4] = [Self::Grant, Self::Deny, Self::Change, Self::Timeout];

    pub fn log_path(self) -> &'static str {
        match self {
            TranscriptProfile::Grant => "transcripts/grant.log",
            TranscriptProfile::Deny => "transcripts/deny.log",
            TranscriptProfile::Change => "transcripts/change.log",
            TranscriptProfile::Timeout => "transcripts/timeout.log",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            TranscriptProfile::Grant => "Sonar lock emulator: access granted",
            TranscriptProfile::Deny => "Sonar lock emulator: wrong password then retry",
            TranscriptProfile::Change => "Sonar lock emulator: password change",
            TranscriptProfile::Timeout => "Sonar lock emulator: entry window expires",
        }
    }

    /// Console lines replayed for this profile.
    pub fn script(self) -> &'static [&'static str] {
        match self {
            TranscriptProfile::Grant => &["run 2s", "dial 7", "status", "enter 1111", "status"],
            TranscriptProfile::Deny => &["run 2s", "enter 1234", "run 2s", "enter 1111", "status"],
            TranscriptProfile::Change => &[
                "run 2s",
                "enter 1111",
                "tap mode",
                "change 2024",
                "run 2s",
                "enter 1111",
                "run 2s",
                "enter 2024",
                "status",
            ],
            TranscriptProfile::Timeout => &["run 2s", "enter 12", "run 20s", "status", "run 1s"],
        }
    }
}

/// One line of emulator output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reply {
    Text(String),
    /// Active-low LED register, rendered as a bar.
    Leds(u8),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Text(text) => f.write_str(text),
            Reply::Leds(pattern) => {
                f.write_str("LED ")?;
                for bit in 0..8 {
                    let lit = pattern & (1 << bit) == 0;
                    f.write_str(if lit { "*" } else { "." })?;
                }
                Ok(())
            }
        }
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

pub struct Session {
    lock: LockController<MemoryBoard>,
    config: LockConfig,
    transcript: Option<TranscriptLogger>,
    shown_revision: u32,
    halt_reported: bool,
}

impl Session {
    pub fn new(reference: Passcode, transcript: Option<TranscriptLogger>) -> io::Result<Self> {
        let config = LockConfig::DEFAULT.with_reference(reference);
        let mut lock = LockController::new(memory_board(0), config);
        lock.start()
            .map_err(|fault| io::Error::other(format!("peripheral {fault} rejected setup")))?;
        let shown_revision = lock.device().peripherals().display.revision();

        Ok(Self {
            lock,
            config,
            transcript,
            shown_revision,
            halt_reported: false,
        })
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<Reply>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        self.log(TranscriptRole::Host, trimmed)?;

        let mut replies = Vec::new();
        match console::parse(trimmed) {
            Ok(command) => self.execute(command, &mut replies),
            Err(err) => replies.push(format!("ERR {err}").into()),
        }
        self.show_display_if_changed(&mut replies);

        for reply in &replies {
            self.log(TranscriptRole::Emulator, &reply.to_string())?;
        }
        Ok(replies)
    }

    fn execute(&mut self, command: ConsoleCommand<'_>, replies: &mut Vec<Reply>) {
        match command {
            ConsoleCommand::Dial(distance) => {
                self.board().sonar.set_distance(distance);
                replies.push(format!("OK dial {distance}cm").into());
            }
            ConsoleCommand::Press(button) => {
                self.board().buttons.press(button);
                replies.push(format!("OK press {button}").into());
            }
            ConsoleCommand::Release(Some(button)) => {
                self.board().buttons.release(button);
                replies.push(format!("OK release {button}").into());
            }
            ConsoleCommand::Release(None) => {
                self.board().buttons.release_all();
                replies.push("OK release all".to_string().into());
            }
            ConsoleCommand::Tap(button) => {
                if self.refuse_if_halted(replies) {
                    return;
                }
                self.tap(button, replies);
            }
            ConsoleCommand::Run(ticks) => {
                if self.refuse_if_halted(replies) {
                    return;
                }
                self.advance(ticks, replies);
                replies.push(format!("OK tick={}", self.lock.elapsed()).into());
            }
            ConsoleCommand::Enter(digits) => {
                if self.refuse_if_halted(replies) {
                    return;
                }
                self.dial_digits(&digits, Button::Confirm, replies);
            }
            ConsoleCommand::Change(digits) => {
                if self.refuse_if_halted(replies) {
                    return;
                }
                self.dial_digits(&digits, Button::Mode, replies);
            }
            ConsoleCommand::Status => self.status(replies),
            ConsoleCommand::Help(topic) => help(topic, replies),
            ConsoleCommand::Exit => replies.push("Session closed.".to_string().into()),
        }
    }

    fn board(&mut self) -> &mut MemoryBoard {
        self.lock.device_mut().peripherals_mut()
    }

    fn refuse_if_halted(&self, replies: &mut Vec<Reply>) -> bool {
        let halted = self.lock.is_halted();
        if halted {
            replies.push("ERR halted".to_string().into());
        }
        halted
    }

    /// Runs `ticks` scheduler passes, draining events after each one.
    /// Returns `false` once the lock has halted.
    fn advance(&mut self, ticks: u32, replies: &mut Vec<Reply>) -> bool {
        for _ in 0..ticks {
            let outcome = self.lock.tick();
            while let Some(record) = self.lock.pop_event() {
                replies.push(format!("EVT {record}").into());
            }
            if let TickOutcome::Halted { slot } = outcome {
                if !self.halt_reported {
                    self.halt_reported = true;
                    replies.push(
                        format!("HALT tick={} slot={slot}", self.lock.elapsed()).into(),
                    );
                }
                return false;
            }
        }
        true
    }

    fn tap(&mut self, button: Button, replies: &mut Vec<Reply>) -> bool {
        let period = self.config.poll_period;
        self.board().buttons.press(button);
        let running = self.advance(period, replies);
        self.board().buttons.release(button);
        running && self.advance(period, replies)
    }

    fn dial_digits(&mut self, digits: &DigitBuffer, button: Button, replies: &mut Vec<Reply>) {
        for &digit in digits {
            let distance = self.config.distance_for(digit);
            self.board().sonar.set_distance(distance);
            if !self.advance(self.config.poll_period, replies) || !self.tap(button, replies) {
                return;
            }
        }
        replies.push(format!("OK tick={}", self.lock.elapsed()).into());
    }

    fn status(&self, replies: &mut Vec<Reply>) {
        let device = self.lock.device();
        let outcome = device
            .last_outcome()
            .map_or_else(|| "none".to_string(), |outcome| outcome.to_string());
        replies.push(
            format!(
                "phase={} outcome={outcome} tick={}",
                self.lock.phase(),
                self.lock.elapsed()
            )
            .into(),
        );
        push_display(device.peripherals(), replies);
        replies.push(Reply::Leds(device.peripherals().leds.pattern()));
        let digit = device
            .current_digit()
            .map_or_else(|| "-".to_string(), |digit| digit.to_string());
        replies.push(
            format!(
                "cursor={} new-cursor={} digit={digit} distance={}cm led-delay={} timeout-step={}",
                device.entry().cursor(),
                device.new_password_cursor(),
                device.peripherals().sonar.distance(),
                device.led_delay(),
                device.timeout_count(),
            )
            .into(),
        );
        let dropped = device.events().dropped();
        if dropped > 0 {
            replies.push(format!("events-dropped={dropped}").into());
        }
    }

    fn show_display_if_changed(&mut self, replies: &mut Vec<Reply>) {
        let board = self.lock.device().peripherals();
        let revision = board.display.revision();
        if revision != self.shown_revision {
            self.shown_revision = revision;
            push_display(board, replies);
        }
    }

    fn log(&mut self, role: TranscriptRole, line: &str) -> io::Result<()> {
        let tick = self.lock.elapsed();
        match self.transcript.as_mut() {
            Some(logger) => logger.append_line(tick, role, line),
            None => Ok(()),
        }
    }
}

fn push_display(board: &MemoryBoard, replies: &mut Vec<Reply>) {
    for row in 0..2 {
        replies.push(format!("LCD |{}|", board.display.line(row)).into());
    }
}

fn help(topic: Option<&str>, replies: &mut Vec<Reply>) {
    match topic {
        Some(target) => {
            if let Some(spec) = catalog::find(target) {
                replies.push(format!("{} - {}", spec.usage, spec.summary).into());
            } else {
                replies.push(format!("No help available for `{target}`.").into());
                replies.push(format!("Available topics: {}", topic_list()).into());
            }
        }
        None => {
            replies.push("Available commands:".to_string().into());
            for spec in COMMANDS {
                replies.push(format!("  {:<24} - {}", spec.usage, spec.summary).into());
            }
            replies.push("Type `help <topic>` for a specific command.".to_string().into());
        }
    }
}

fn topic_list() -> String {
    COMMANDS
        .iter()
        .map(|spec| spec.name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct TranscriptLogger {
    writer: BufWriter<File>,
}

impl TranscriptLogger {
    pub fn create(path: impl AsRef<Path>, header: &str) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };
        writeln!(logger.writer, "# {header}")?;
        writeln!(logger.writer, "# Timestamps are scheduler ticks (1 ms each)")?;
        writeln!(logger.writer)?;
        logger.writer.flush()?;
        Ok(logger)
    }

    pub fn for_profile(profile: TranscriptProfile) -> io::Result<Self> {
        Self::create(PathBuf::from(profile.log_path()), profile.header())
    }

    fn append_line(&mut self, tick: u64, role: TranscriptRole, line: &str) -> io::Result<()> {
        writeln!(self.writer, "[{tick:>6}] {} {line}", role.prefix())?;
        self.writer.flush()
    }
}

#[derive(Clone, Copy)]
enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lock_core::config::DEFAULT_PASSCODE;

    fn session() -> Session {
        Session::new(DEFAULT_PASSCODE, None).unwrap()
    }

    fn texts(replies: &[Reply]) -> Vec<String> {
        replies.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn boot_paints_entry_screen() {
        let mut session = session();
        let lines = texts(&session.handle_command("run 2s").unwrap());

        assert!(lines.contains(&"EVT [1] screen welcome".to_string()));
        assert!(lines.contains(&"OK tick=2000".to_string()));
        assert!(lines.iter().any(|line| line.starts_with("LCD |PASSWORD")));
    }

    #[test]
    fn default_password_grants_access() {
        let mut session = session();
        session.handle_command("run 2s").unwrap();
        let lines = texts(&session.handle_command("enter 1111").unwrap());

        assert!(lines.iter().any(|line| line.ends_with("access-granted")));
        assert!(lines.iter().any(|line| line.starts_with("LCD |ACCESS")));
    }

    #[test]
    fn syntax_errors_report_offset() {
        let mut session = session();
        let lines = texts(&session.handle_command("run fast").unwrap());
        assert_eq!(lines, ["ERR syntax at 4"]);
    }

    #[test]
    fn halted_lock_refuses_to_run() {
        let mut session = session();
        let lines = texts(&session.handle_command("run 30s").unwrap());
        assert!(lines.iter().any(|line| line.starts_with("HALT tick=22000")));

        let lines = texts(&session.handle_command("tap confirm").unwrap());
        assert_eq!(lines, ["ERR halted"]);
    }

    #[test]
    fn status_renders_led_bar() {
        let mut session = session();
        let replies = session.handle_command("status").unwrap();
        assert!(replies.contains(&Reply::Leds(0xFE)));
        assert_eq!(Reply::Leds(0xFE).to_string(), "LED *.......");
    }

    #[test]
    fn help_lists_every_command() {
        let mut session = session();
        let lines = texts(&session.handle_command("help").unwrap());
        assert_eq!(lines.len(), COMMANDS.len() + 2);

        let lines = texts(&session.handle_command("help tap").unwrap());
        assert_eq!(
            lines,
            ["tap confirm|mode - press and release a button, one poll period each"]
        );
    }
}
