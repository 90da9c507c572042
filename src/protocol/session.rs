use log::{debug, trace, warn};

use super::accumulator::{Accumulator, LineEvent};
use super::dispatch::{Dispatcher, Reply};
use super::error::ProtocolError;
use super::frame;
use super::kind::{classify, MessageKind};
use super::response::{ResponseFormat, BELL, ERASE_ECHO};
use crate::config::ProtocolConfig;
use crate::logutil::escape_log;
use crate::metrics;
use crate::outputs::OutputControl;

/// # Protocol Session
///
/// One session exists per serial link. It owns the line being typed, the
/// dispatcher (and through it the output capability) and the response
/// settings. Nothing else in the process holds protocol state.
///
/// ## Byte handling
///
/// [`Session::feed`] is called once per received byte and returns the exact
/// bytes to transmit before the next byte is delivered:
///
/// - printable byte: echoed back
/// - DEL: visual backspace, or a bell when the line is already empty
/// - CR: the completed line is parsed, classified and dispatched, then
///   answered with ACK/NACK text and a fresh prompt
/// - the `capacity + 1`th printable byte: ` -> OV` notice and prompt; the
///   line is discarded
///
/// ## Usage
///
/// ```rust
/// use serialprot::config::ProtocolConfig;
/// use serialprot::outputs::OutputBank;
/// use serialprot::protocol::Session;
///
/// let mut session = Session::new("doc", &ProtocolConfig::default(), OutputBank::new(["bl"]));
/// let mut out = Vec::new();
/// for b in b"#add,3:4\r" {
///     out.extend(session.feed(*b));
/// }
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.ends_with("ACK -> #add,3:4 => #a,7\n\rInput> "));
/// ```
pub struct Session<O> {
    pub id: String,
    accumulator: Accumulator,
    dispatcher: Dispatcher<O>,
    format: ResponseFormat,
    last_outcome: Option<LineOutcome>,
}

/// What a completed line turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line was just the terminator.
    Empty,
    Ack { kind: MessageKind, reply: Reply },
    Nack(ProtocolError),
}

impl<O: OutputControl> Session<O> {
    pub fn new(id: impl Into<String>, config: &ProtocolConfig, outputs: O) -> Self {
        Session {
            id: id.into(),
            accumulator: Accumulator::new(config.buffer_capacity),
            dispatcher: Dispatcher::new(outputs),
            format: ResponseFormat::new(&config.prompt, &config.marker_prefix),
            last_outcome: None,
        }
    }

    /// Prompt bytes, for the banner written when a link opens.
    pub fn prompt(&self) -> &[u8] {
        self.format.prompt().as_bytes()
    }

    pub fn outputs(&self) -> &O {
        self.dispatcher.outputs()
    }

    /// Characters typed so far on the current line.
    pub fn pending(&self) -> &[u8] {
        self.accumulator.pending()
    }

    /// Result of the most recently completed line. Cleared by an overflow.
    pub fn last_outcome(&self) -> Option<&LineOutcome> {
        self.last_outcome.as_ref()
    }

    /// Process one received byte and return the bytes to send back.
    pub fn feed(&mut self, byte: u8) -> Vec<u8> {
        match self.accumulator.feed(byte) {
            LineEvent::Continuing(b) => vec![b],
            LineEvent::Erased => {
                metrics::inc_erase();
                ERASE_ECHO.to_vec()
            }
            LineEvent::Bell => BELL.to_vec(),
            LineEvent::Ignored => {
                trace!("Session {}: ignoring byte 0x{:02X}", self.id, byte);
                Vec::new()
            }
            LineEvent::Overflow => {
                let err = ProtocolError::Overflow {
                    capacity: self.accumulator.capacity(),
                };
                metrics::inc_overflow();
                self.last_outcome = None;
                warn!("Session {}: {}", self.id, err);
                let mut out = self.format.overflow();
                out.push_str(self.format.prompt());
                out.into_bytes()
            }
            LineEvent::LineReady(line) => {
                let outcome = self.process_line(&line);
                let mut out = self.render(&line, &outcome);
                out.push_str(self.format.prompt());
                self.accumulator.reset();
                self.last_outcome = Some(outcome);
                out.into_bytes()
            }
        }
    }

    /// Parse, classify and dispatch a completed line (trailing CR included).
    pub fn process_line(&mut self, line: &str) -> LineOutcome {
        if line == "\r" {
            metrics::inc_empty();
            return LineOutcome::Empty;
        }
        debug!("Session {}: line {}", self.id, escape_log(line));

        let outcome = match self.classify_and_dispatch(line) {
            Ok((kind, reply)) => LineOutcome::Ack { kind, reply },
            Err(e) => LineOutcome::Nack(e),
        };
        match &outcome {
            LineOutcome::Ack { reply, .. } => {
                metrics::inc_ack();
                debug!(
                    "Session {}: ACK {} value={:?}",
                    self.id, reply.command, reply.value
                );
            }
            LineOutcome::Nack(e) => {
                metrics::inc_nack(e.is_grammar());
                warn!(
                    "Session {}: NACK {} ({})",
                    self.id,
                    escape_log(line),
                    e
                );
            }
            LineOutcome::Empty => {}
        }
        outcome
    }

    /// Response body for `outcome`, without the trailing prompt.
    pub fn render(&self, line: &str, outcome: &LineOutcome) -> String {
        match outcome {
            LineOutcome::Empty => self.format.empty(),
            LineOutcome::Ack { reply, .. } => self.format.ack(line, reply.value.as_deref()),
            LineOutcome::Nack(_) => self.format.nack(line),
        }
    }

    fn classify_and_dispatch(
        &mut self,
        line: &str,
    ) -> Result<(MessageKind, Reply), ProtocolError> {
        let frame = frame::parse(line)?;
        let kind = classify(&frame.param1, &frame.param2).ok_or(ProtocolError::Malformed {
            reason: "parameters are neither numeric nor alphabetic",
        })?;
        let reply = self.dispatcher.dispatch(kind, &frame)?;
        Ok((kind, reply))
    }
}
