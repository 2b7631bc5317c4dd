//! Borrowed message parsing.
//!
//! A line has the shape
//!
//! ```text
//! [:prefix] <verb> [arg ...] [:trailing]
//! ```
//!
//! Runs of spaces separate arguments. An argument that starts with `:` takes
//! the rest of the line, spaces included. At most [`MAX_PARAMS`] arguments are
//! kept; anything after the fifteenth is ignored.

use crate::error::{ProtocolError, Result};
use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::opt,
    error::ErrorKind,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

/// Maximum number of arguments after the verb.
pub const MAX_PARAMS: usize = 15;

fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Verb: letters, or exactly three digits.
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_ascii_alphanumeric())(input)?;

    let all_letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let three_digits = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());
    if !(all_letters || three_digits) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )));
    }
    // The verb must end at a separator or end of line.
    match rest.chars().next() {
        None | Some(' ') | Some('\r') | Some('\n') => Ok((rest, cmd)),
        Some(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Space,
        ))),
    }
}

fn parse_params(input: &str) -> (&str, SmallVec<[&str; MAX_PARAMS]>) {
    let mut params: SmallVec<[&str; MAX_PARAMS]> = SmallVec::new();
    let mut rest = input;

    while rest.starts_with(' ') {
        if params.len() >= MAX_PARAMS {
            break;
        }

        rest = rest.trim_start_matches(' ');
        if rest.is_empty() || rest.starts_with(['\r', '\n']) {
            break;
        }

        if let Some(after_colon) = rest.strip_prefix(':') {
            let end = after_colon.find(['\r', '\n']).unwrap_or(after_colon.len());
            params.push(&after_colon[..end]);
            rest = &after_colon[end..];
            break;
        }

        let end = rest.find([' ', '\r', '\n']).unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    (rest, params)
}

fn parse_line(line: &str) -> IResult<&str, MessageRef<'_>> {
    let (i, _) = space0(line)?;
    let (i, prefix) = opt(parse_prefix)(i)?;
    let (i, _) = space0(i)?;
    let (i, command) = parse_command(i)?;
    let (i, params) = parse_params(i);
    Ok((
        i,
        MessageRef {
            prefix,
            command,
            params,
        },
    ))
}

/// A parsed line borrowing from the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef<'a> {
    /// Source prefix without the leading `:`, if the client sent one.
    pub prefix: Option<&'a str>,
    /// The verb exactly as sent.
    pub command: &'a str,
    /// Positional arguments, the trailing argument last.
    pub params: SmallVec<[&'a str; MAX_PARAMS]>,
}

impl<'a> MessageRef<'a> {
    /// Parse one line. A trailing CR/LF is tolerated.
    ///
    /// Returns [`ProtocolError::InvalidMessage`] for empty lines and lines
    /// without a verb.
    pub fn parse(input: &'a str) -> Result<Self> {
        let line = input.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(invalid(input, "empty line"));
        }

        let parsed = parse_line(line);

        match parsed {
            Ok((_, msg)) => Ok(msg),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(invalid(
                input,
                &format!(
                    "{:?} at position {}",
                    e.code,
                    line.len().saturating_sub(e.input.len())
                ),
            )),
            Err(nom::Err::Incomplete(_)) => Err(invalid(input, "incomplete line")),
        }
    }

    /// The verb as sent (not case-normalised).
    #[inline]
    pub fn command_name(&self) -> &'a str {
        self.command
    }

    /// Argument `n`, zero-based.
    #[inline]
    pub fn arg(&self, n: usize) -> Option<&'a str> {
        self.params.get(n).copied()
    }

    /// All arguments.
    #[inline]
    pub fn args(&self) -> &[&'a str] {
        &self.params
    }

    /// The last argument, which is the free-text one for PRIVMSG, PART and QUIT.
    #[inline]
    pub fn trailing(&self) -> Option<&'a str> {
        self.params.last().copied()
    }
}

fn invalid(input: &str, cause: &str) -> ProtocolError {
    ProtocolError::InvalidMessage {
        string: input.to_string(),
        cause: cause.to_string(),
    }
}
