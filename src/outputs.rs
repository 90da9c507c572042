//! Switchable outputs driven by the `gpo` command.
//!
//! The protocol engine only sees the [`OutputControl`] trait. A session is
//! constructed with one implementation and never runs without it. The
//! default [`OutputBank`] keeps the output levels in memory and logs each
//! change; the reference board drove an RGB LED with channels `gn`, `bl`
//! and `rt`.
use log::info;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    On,
    Off,
}

impl FromStr for OutputState {
    type Err = OutputError;

    /// Only the exact lowercase tokens are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(OutputState::On),
            "off" => Ok(OutputState::Off),
            other => Err(OutputError::UnknownState(other.to_string())),
        }
    }
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputState::On => f.write_str("on"),
            OutputState::Off => f.write_str("off"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    #[error("unknown output '{0}'")]
    UnknownTarget(String),
    #[error("unknown output state '{0}'")]
    UnknownState(String),
}

/// Action capability invoked synchronously while a line is dispatched.
/// Implementations must return quickly; they run between two received bytes.
pub trait OutputControl {
    fn perform(&mut self, target: &str, state: OutputState) -> Result<(), OutputError>;
}

impl<T: OutputControl + ?Sized> OutputControl for Box<T> {
    fn perform(&mut self, target: &str, state: OutputState) -> Result<(), OutputError> {
        (**self).perform(target, state)
    }
}

/// In-memory set of named outputs, all off at startup.
#[derive(Debug, Clone, Default)]
pub struct OutputBank {
    outputs: BTreeMap<String, OutputState>,
}

impl OutputBank {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OutputBank {
            outputs: names
                .into_iter()
                .map(|n| (n.into(), OutputState::Off))
                .collect(),
        }
    }

    pub fn state(&self, name: &str) -> Option<OutputState> {
        self.outputs.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }
}

impl OutputControl for OutputBank {
    fn perform(&mut self, target: &str, state: OutputState) -> Result<(), OutputError> {
        let slot = self
            .outputs
            .get_mut(target)
            .ok_or_else(|| OutputError::UnknownTarget(target.to_string()))?;
        if *slot != state {
            info!(target: "serialprot::outputs", "output {} -> {}", target, state);
        }
        *slot = state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_tokens_only() {
        assert_eq!("on".parse::<OutputState>(), Ok(OutputState::On));
        assert_eq!("off".parse::<OutputState>(), Ok(OutputState::Off));
        assert!("ON".parse::<OutputState>().is_err());
        assert!("1".parse::<OutputState>().is_err());
    }

    #[test]
    fn bank_switches_known_outputs() {
        let mut bank = OutputBank::new(["gn", "bl", "rt"]);
        assert_eq!(bank.state("bl"), Some(OutputState::Off));
        bank.perform("bl", OutputState::On).unwrap();
        assert_eq!(bank.state("bl"), Some(OutputState::On));
        assert_eq!(bank.state("gn"), Some(OutputState::Off));
        assert_eq!(
            bank.perform("ye", OutputState::On),
            Err(OutputError::UnknownTarget("ye".into()))
        );
    }
}
