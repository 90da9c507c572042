//! Test utilities & fixtures shared by the integration tests.
#![allow(dead_code)] // each test binary uses a different subset

use serialprot::config::ProtocolConfig;
use serialprot::outputs::{OutputBank, OutputControl, OutputError, OutputState};
use serialprot::protocol::Session;

/// Session with the default settings and the standard `gn`/`bl`/`rt` outputs.
pub fn session() -> Session<OutputBank> {
    Session::new(
        "test",
        &ProtocolConfig::default(),
        OutputBank::new(["gn", "bl", "rt"]),
    )
}

pub fn session_with<O: OutputControl>(config: &ProtocolConfig, outputs: O) -> Session<O> {
    Session::new("test", config, outputs)
}

/// Feed every byte of `input` and collect the transmitted text.
pub fn feed_str<O: OutputControl>(session: &mut Session<O>, input: &str) -> String {
    let mut out = Vec::new();
    for b in input.bytes() {
        out.extend(session.feed(b));
    }
    String::from_utf8(out).expect("responses are ASCII")
}

/// Output capability that records every call and fails for `failing`
/// targets.
#[derive(Debug, Default)]
pub struct RecordingOutputs {
    pub calls: Vec<(String, OutputState)>,
    pub failing: Vec<String>,
}

impl RecordingOutputs {
    pub fn failing_on(target: &str) -> Self {
        RecordingOutputs {
            calls: Vec::new(),
            failing: vec![target.to_string()],
        }
    }
}

impl OutputControl for RecordingOutputs {
    fn perform(&mut self, target: &str, state: OutputState) -> Result<(), OutputError> {
        self.calls.push((target.to_string(), state));
        if self.failing.iter().any(|t| t == target) {
            return Err(OutputError::UnknownTarget(target.to_string()));
        }
        Ok(())
    }
}
