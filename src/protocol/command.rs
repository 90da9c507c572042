//! Built-in command set, keyed by (kind, name).
//!
//! | name | kinds                              | result              |
//! |------|------------------------------------|---------------------|
//! | rdm  | number-number                      | random in [p1, p2]  |
//! | add  | number-number                      | p1 + p2             |
//! | asc  | text-number, number-text          | code of p1          |
//! | gpo  | text-text                          | switch output p1    |
use super::error::ProtocolError;
use super::frame::Frame;
use super::kind::MessageKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Random { low: u32, high: u32 },
    Add { lhs: u32, rhs: u32 },
    Ascii { symbol: &'a str, arg: &'a str },
    Output { target: &'a str, state: &'a str },
}

impl<'a> Command<'a> {
    /// Pick the handler for this frame. Any pair not in the table is an
    /// unknown command, even if the name exists under another kind.
    pub fn resolve(kind: MessageKind, frame: &'a Frame) -> Result<Self, ProtocolError> {
        use MessageKind::*;
        match (kind, frame.name.as_str()) {
            (NumberNumber, "rdm") => Ok(Command::Random {
                low: leading_number(&frame.param1),
                high: leading_number(&frame.param2),
            }),
            (NumberNumber, "add") => Ok(Command::Add {
                lhs: leading_number(&frame.param1),
                rhs: leading_number(&frame.param2),
            }),
            (TextNumber | NumberText, "asc") => Ok(Command::Ascii {
                symbol: &frame.param1,
                arg: &frame.param2,
            }),
            (TextText, "gpo") => Ok(Command::Output {
                target: &frame.param1,
                state: &frame.param2,
            }),
            (kind, name) => Err(ProtocolError::UnknownCommand {
                name: name.to_string(),
                kind: kind.as_str(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Random { .. } => "rdm",
            Command::Add { .. } => "add",
            Command::Ascii { .. } => "asc",
            Command::Output { .. } => "gpo",
        }
    }
}

/// Value of the leading decimal digits of `s`, 0 when there are none.
pub fn leading_number(s: &str) -> u32 {
    s.bytes()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        })
}
