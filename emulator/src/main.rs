mod session;

use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process;

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use lock_core::config::DEFAULT_PASSCODE;
use lock_core::console::catalog::{self, CommandTag};
use lock_core::password::Passcode;

use session::{Reply, Session, TranscriptLogger};

const USAGE: &str = "Usage: lock-emulator [--password <4 digits>] [--transcript <path>]";

struct Options {
    password: Passcode,
    transcript: Option<String>,
}

fn main() -> io::Result<()> {
    let options = parse_options().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    let transcript = options
        .transcript
        .map(|path| TranscriptLogger::create(path, "Sonar lock emulator session"))
        .transpose()?;

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let colour = stdout.is_terminal();
    let mut writer = stdout.lock();
    let mut session = Session::new(options.password, transcript)?;
    let mut line = String::new();

    writeln!(
        writer,
        "Sonar Lock Emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for reply in session.handle_command(trimmed)? {
            print_reply(&mut writer, &reply, colour)?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    catalog::find(input).is_some_and(|spec| spec.tag == CommandTag::Exit)
}

fn print_reply(writer: &mut impl Write, reply: &Reply, colour: bool) -> io::Result<()> {
    let Reply::Leds(pattern) = reply else {
        return writeln!(writer, "{reply}");
    };
    if !colour {
        return writeln!(writer, "{reply}");
    }

    queue!(writer, Print("LED "))?;
    for bit in 0..8 {
        let lit = pattern & (1 << bit) == 0;
        let (tint, glyph) = if lit {
            (Color::Red, "●")
        } else {
            (Color::DarkGrey, "○")
        };
        queue!(writer, SetForegroundColor(tint), Print(glyph))?;
    }
    queue!(writer, ResetColor, Print("\n"))?;
    writer.flush()
}

fn parse_options() -> Result<Options, String> {
    let mut options = Options {
        password: DEFAULT_PASSCODE,
        transcript: None,
    };
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg, None),
        };
        let mut value = || {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| format!("Expected value after {flag}"))
        };

        match flag.as_str() {
            "--password" => {
                let text = value()?;
                options.password = Passcode::parse(&text)
                    .ok_or_else(|| format!("Password must be 4 digits, got `{text}`"))?;
            }
            "--transcript" => options.transcript = Some(value()?),
            other => return Err(format!("Unknown argument `{other}`")),
        }
    }

    Ok(options)
}
