//! Command dispatch.
//!
//! The dispatcher owns the output capability it was built with and routes a
//! classified frame to exactly one handler. `rdm` reseeds its generator from
//! a monotonic tick count on every call, so results are not suitable for
//! anything security related.
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use super::command::{leading_number, Command};
use super::error::ProtocolError;
use super::frame::Frame;
use super::kind::MessageKind;
use crate::outputs::{OutputControl, OutputState};

/// Successful handler result. `value` is rendered as `#a,<value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub command: &'static str,
    pub value: Option<String>,
}

impl Reply {
    fn value(command: &'static str, v: impl ToString) -> Self {
        Reply {
            command,
            value: Some(v.to_string()),
        }
    }

    fn ack(command: &'static str) -> Self {
        Reply {
            command,
            value: None,
        }
    }
}

pub struct Dispatcher<O> {
    outputs: O,
    epoch: Instant,
}

impl<O: OutputControl> Dispatcher<O> {
    pub fn new(outputs: O) -> Self {
        Dispatcher {
            outputs,
            epoch: Instant::now(),
        }
    }

    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut O {
        &mut self.outputs
    }

    pub fn dispatch(&mut self, kind: MessageKind, frame: &Frame) -> Result<Reply, ProtocolError> {
        let command = Command::resolve(kind, frame)?;
        debug!("dispatch {} ({}) {}", command.name(), kind, frame);
        match command {
            Command::Random { low, high } => {
                if low >= high {
                    return Err(rejected("rdm", "lower bound must be below upper bound"));
                }
                let mut rng = StdRng::seed_from_u64(self.ticks());
                Ok(Reply::value("rdm", rng.gen_range(low..=high)))
            }
            Command::Add { lhs, rhs } => Ok(Reply::value("add", lhs.saturating_add(rhs))),
            Command::Ascii { symbol, arg } => {
                let mut chars = symbol.chars();
                let ch = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(rejected("asc", "expects a single character")),
                };
                if leading_number(arg) != 0 {
                    return Err(rejected("asc", "second parameter must be zero"));
                }
                Ok(Reply::value("asc", u32::from(ch)))
            }
            Command::Output { target, state } => {
                let state: OutputState = state.parse().map_err(|e| failed("gpo", e))?;
                self.outputs
                    .perform(target, state)
                    .map_err(|e| failed("gpo", e))?;
                Ok(Reply::ack("gpo"))
            }
        }
    }

    fn ticks(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

fn rejected(name: &str, reason: &'static str) -> ProtocolError {
    ProtocolError::HandlerRejected {
        name: name.to_string(),
        reason,
    }
}

fn failed(name: &str, e: impl ToString) -> ProtocolError {
    ProtocolError::HandlerFailed {
        name: name.to_string(),
        reason: e.to_string(),
    }
}
