//! Frame grammar: `#<name>,<param1>:<param2><CR>`.
//!
//! The checks run in a fixed order and the first failure wins. The comma is
//! required at byte offset 4, which pins the command name to exactly three
//! characters before any splitting happens.
use std::fmt;

use super::error::ParseError;

pub const START: u8 = b'#';
pub const NAME_SEP: char = ',';
pub const PARAM_SEP: char = ':';
pub const TERMINATOR: char = '\r';

/// Byte offset of the name/parameter separator.
pub const NAME_SEP_OFFSET: usize = 4;
pub const MAX_NAME_LEN: usize = 3;
pub const MAX_PARAM_LEN: usize = 4;

/// A grammatically valid line split into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub name: String,
    pub param1: String,
    pub param2: String,
}

impl Frame {
    /// Canonical wire form, including the trailing carriage return.
    pub fn to_line(&self) -> String {
        format!(
            "#{}{}{}{}{}{}",
            self.name, NAME_SEP, self.param1, PARAM_SEP, self.param2, TERMINATOR
        )
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{},{}:{}", self.name, self.param1, self.param2)
    }
}

fn count(line: &str, c: char) -> usize {
    line.chars().filter(|&x| x == c).count()
}

/// Validate `line` (which must still carry its trailing `\r`) and split it.
pub fn parse(line: &str) -> Result<Frame, ParseError> {
    if line.as_bytes().first() != Some(&START) {
        return Err(ParseError::Malformed("missing leading '#'"));
    }
    if line.find(NAME_SEP) != Some(NAME_SEP_OFFSET) || count(line, NAME_SEP) != 1 {
        return Err(ParseError::Malformed("',' must appear once, after a 3-letter name"));
    }
    if count(line, PARAM_SEP) != 1 {
        return Err(ParseError::Malformed("':' must appear exactly once"));
    }
    let body = match line.find(TERMINATOR) {
        Some(pos) if pos == line.len() - 1 => &line[..pos],
        _ => return Err(ParseError::Malformed("line must end with a single CR")),
    };

    let name = &body[1..NAME_SEP_OFFSET];
    let params = &body[NAME_SEP_OFFSET + 1..];
    let (param1, param2) = params
        .split_once(PARAM_SEP)
        .ok_or(ParseError::Malformed("':' must follow ','"))?;

    if name.len() > MAX_NAME_LEN || !name.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ParseError::Malformed("command name must be alphabetic"));
    }
    if param1.is_empty() || param2.is_empty() {
        return Err(ParseError::Malformed("parameters must not be empty"));
    }
    if param1.len() > MAX_PARAM_LEN || param2.len() > MAX_PARAM_LEN {
        return Err(ParseError::Malformed("parameter longer than 4 characters"));
    }

    Ok(Frame {
        name: name.to_string(),
        param1: param1.to_string(),
        param2: param2.to_string(),
    })
}
