//! Parameter classification.
//!
//! A frame's kind is decided by whether each parameter is numeric or
//! alphabetic. The rules are checked in a fixed order and the first match
//! wins; an empty string is never numeric.
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    NumberNumber,
    TextNumber,
    NumberText,
    TextText,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::NumberNumber => "number-number",
            MessageKind::TextNumber => "text-number",
            MessageKind::NumberText => "number-text",
            MessageKind::TextText => "text-text",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_alphabetic(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Classify a parameter pair. Returns `None` when no rule applies, e.g. a
/// numeric first parameter followed by punctuation.
pub fn classify(param1: &str, param2: &str) -> Option<MessageKind> {
    let (n1, n2) = (is_numeric(param1), is_numeric(param2));
    if n1 && n2 {
        Some(MessageKind::NumberNumber)
    } else if n2 {
        // anything that fails the numeric test counts as text here
        Some(MessageKind::TextNumber)
    } else if n1 && is_alphabetic(param2) {
        Some(MessageKind::NumberText)
    } else if is_alphabetic(param1) && is_alphabetic(param2) {
        Some(MessageKind::TextText)
    } else {
        None
    }
}
