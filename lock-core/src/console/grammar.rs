use winnow::ascii::{Caseless, alpha1, dec_uint, space0, space1};
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::stream::Stream;
use winnow::token::{literal, take_while};

use super::catalog::{self, CommandTag};
use super::{ConsoleCommand, DigitBuffer, MAX_DIGITS, ParseError};
use crate::password::Digit;
use crate::peripherals::Button;

type PResult<O> = Result<O, ContextError>;

/// Parses one console line. Surrounding blanks and a trailing line ending
/// are ignored.
///
/// # Errors
///
/// Returns the byte offset at which the line stopped matching the grammar.
pub fn parse(line: &str) -> Result<ConsoleCommand<'_>, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    delimited(space0, command, space0)
        .parse(line)
        .map_err(|error| ParseError {
            offset: error.offset(),
        })
}

fn command<'a>(input: &mut &'a str) -> PResult<ConsoleCommand<'a>> {
    let start = input.checkpoint();
    let name = keyword(input)?;
    let Some(spec) = catalog::find(name) else {
        input.reset(&start);
        return Err(ContextError::new());
    };

    let command = match spec.tag {
        CommandTag::Dial => ConsoleCommand::Dial(preceded(space1, distance).parse_next(input)?),
        CommandTag::Press => ConsoleCommand::Press(preceded(space1, button).parse_next(input)?),
        CommandTag::Release => {
            ConsoleCommand::Release(opt(preceded(space1, button)).parse_next(input)?)
        }
        CommandTag::Tap => ConsoleCommand::Tap(preceded(space1, button).parse_next(input)?),
        CommandTag::Run => ConsoleCommand::Run(preceded(space1, ticks).parse_next(input)?),
        CommandTag::Enter => ConsoleCommand::Enter(preceded(space1, digits).parse_next(input)?),
        CommandTag::Change => ConsoleCommand::Change(preceded(space1, digits).parse_next(input)?),
        CommandTag::Status => ConsoleCommand::Status,
        CommandTag::Help => ConsoleCommand::Help(opt(preceded(space1, keyword)).parse_next(input)?),
        CommandTag::Exit => ConsoleCommand::Exit,
    };
    Ok(command)
}

fn keyword<'a>(input: &mut &'a str) -> PResult<&'a str> {
    alpha1.parse_next(input)
}

fn distance(input: &mut &str) -> PResult<u16> {
    dec_uint.parse_next(input)
}

fn button(input: &mut &str) -> PResult<Button> {
    alpha1
        .verify_map(|word: &str| {
            if word.eq_ignore_ascii_case("confirm") {
                Some(Button::Confirm)
            } else if word.eq_ignore_ascii_case("mode") {
                Some(Button::Mode)
            } else {
                None
            }
        })
        .parse_next(input)
}

/// `<n>`, `<n>ms` or `<n>s`, converted to ticks of one millisecond.
fn ticks(input: &mut &str) -> PResult<u32> {
    (dec_uint, opt(unit))
        .verify_map(|(count, scale): (u32, Option<u32>)| count.checked_mul(scale.unwrap_or(1)))
        .parse_next(input)
}

fn unit(input: &mut &str) -> PResult<u32> {
    alt((
        literal(Caseless("ms")).value(1),
        literal(Caseless("s")).value(1_000),
    ))
    .parse_next(input)
}

fn digits(input: &mut &str) -> PResult<DigitBuffer> {
    take_while(1..=MAX_DIGITS, '0'..='9')
        .verify_map(|text: &str| {
            text.bytes()
                .map(Digit::from_ascii)
                .collect::<Option<DigitBuffer>>()
        })
        .parse_next(input)
}
