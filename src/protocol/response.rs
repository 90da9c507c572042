//! Response text for completed lines.
//!
//! Every line-terminating event is answered with one of the bodies below,
//! followed by the prompt. Per-byte echo (characters, erase, bell) bypasses
//! this module; the session writes those bytes directly.

pub const NEW_LINE: &str = "\n\r";
pub const RESULT_PREFIX: &str = "#a,";
pub const DEFAULT_PROMPT: &str = "Input> ";
pub const OVERFLOW_NOTICE: &str = " -> OV";

/// Echo for an erased character: step back, blank it, step back again.
pub const ERASE_ECHO: &[u8] = b"\x08 \x08";
/// Echo for an erase request on an empty line.
pub const BELL: &[u8] = b"\x07";

#[derive(Debug, Clone)]
pub struct ResponseFormat {
    ack: String,
    nack: String,
    prompt: String,
}

impl Default for ResponseFormat {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT, "")
    }
}

impl ResponseFormat {
    /// `marker_prefix` is prepended to both markers, e.g. `STM32-` gives
    /// `STM32-ACK -> `.
    pub fn new(prompt: &str, marker_prefix: &str) -> Self {
        ResponseFormat {
            ack: format!("{marker_prefix}ACK -> "),
            nack: format!("{marker_prefix}NACK -> "),
            prompt: prompt.to_string(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Acknowledge `line`. The trailing CR is dropped from the echo; a
    /// computed value is appended as ` => #a,<value>`.
    pub fn ack(&self, line: &str, value: Option<&str>) -> String {
        let echoed = line.strip_suffix('\r').unwrap_or(line);
        match value {
            Some(v) => format!(
                "{NEW_LINE}{}{echoed} => {RESULT_PREFIX}{v}{NEW_LINE}",
                self.ack
            ),
            None => format!("{NEW_LINE}{}{echoed}{NEW_LINE}", self.ack),
        }
    }

    /// Reject `line`, echoing it unchanged.
    pub fn nack(&self, line: &str) -> String {
        format!("{NEW_LINE}{}{line}{NEW_LINE}", self.nack)
    }

    /// Answer to a line holding nothing but the terminator.
    pub fn empty(&self) -> String {
        NEW_LINE.to_string()
    }

    /// Overflow notice. The discarded buffer is not echoed.
    pub fn overflow(&self) -> String {
        format!("{OVERFLOW_NOTICE}{NEW_LINE}")
    }
}
