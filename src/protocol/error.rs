//! Error taxonomy for the protocol engine.
//!
//! None of these are fatal: after any of them the session is back at an
//! empty buffer with a fresh prompt. Only a transmit failure at the link
//! layer ends a run, and that is reported through `anyhow` by the server.
use thiserror::Error;

/// Why a completed line was not acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// More than `capacity` characters arrived before a carriage return.
    #[error("line buffer overflow (capacity {capacity})")]
    Overflow { capacity: usize },

    /// The line does not follow `#name,p1:p2<CR>`.
    #[error("malformed line: {reason}")]
    Malformed { reason: &'static str },

    /// Grammar was fine but no handler exists for this (kind, name) pair.
    #[error("unknown command '{name}' for {kind}")]
    UnknownCommand { name: String, kind: &'static str },

    /// The handler ran and declined the arguments.
    #[error("command '{name}' rejected: {reason}")]
    HandlerRejected { name: String, reason: &'static str },

    /// The injected action capability reported a failure.
    #[error("command '{name}' failed: {reason}")]
    HandlerFailed { name: String, reason: String },
}

impl ProtocolError {
    /// True for failures detected before dispatch.
    pub fn is_grammar(&self) -> bool {
        matches!(self, ProtocolError::Malformed { .. })
    }

    /// Short label used in logs and eval output.
    pub fn class(&self) -> &'static str {
        match self {
            ProtocolError::Overflow { .. } => "overflow",
            ProtocolError::Malformed { .. } => "malformed",
            ProtocolError::UnknownCommand { .. } => "unknown_command",
            ProtocolError::HandlerRejected { .. } => "handler_rejected",
            ProtocolError::HandlerFailed { .. } => "handler_failed",
        }
    }
}

/// Grammar failure from [`crate::protocol::frame::parse`]. Carries no fields
/// from the rejected line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed frame: {0}")]
    Malformed(&'static str),
}

impl From<ParseError> for ProtocolError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Malformed(reason) => ProtocolError::Malformed { reason },
        }
    }
}
