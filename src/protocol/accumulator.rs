//! Per-byte input accumulator.
//!
//! Bytes arrive one at a time from the link. Printable characters are
//! buffered and echoed, DEL erases, and a carriage return completes the line.
//! The accumulator performs no I/O; it only reports what happened so the
//! session can render the right echo.
use log::trace;

use super::buffer::LineBuffer;

pub const CR: u8 = b'\r';
pub const DEL: u8 = 0x7F;

/// Result of feeding one byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Byte was appended; echo it back.
    Continuing(u8),
    /// Carriage return received. Carries the buffered text plus the trailing
    /// `\r`. The buffer is left intact until [`Accumulator::reset`].
    LineReady(String),
    /// Buffer was already full; it has been cleared and the byte dropped.
    Overflow,
    /// Last buffered character was removed.
    Erased,
    /// Erase requested on an empty buffer.
    Bell,
    /// Byte outside the accepted range; nothing changes.
    Ignored,
}

#[derive(Debug)]
pub struct Accumulator {
    buffer: LineBuffer,
}

impl Accumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: LineBuffer::new(capacity),
        }
    }

    pub fn feed(&mut self, byte: u8) -> LineEvent {
        match byte {
            CR => {
                let mut line = String::with_capacity(self.buffer.len() + 1);
                line.push_str(&self.buffer.to_str_lossy());
                line.push('\r');
                LineEvent::LineReady(line)
            }
            DEL => match self.buffer.pop() {
                Some(_) => LineEvent::Erased,
                None => LineEvent::Bell,
            },
            32..=126 => match self.buffer.try_push(byte) {
                Ok(()) => LineEvent::Continuing(byte),
                Err(_) => {
                    trace!(
                        "accumulator overflow at {} bytes, discarding line",
                        self.buffer.len()
                    );
                    self.buffer.clear();
                    LineEvent::Overflow
                }
            },
            _ => LineEvent::Ignored,
        }
    }

    /// Drop the in-progress line. Called by the session once a completed
    /// line has been answered.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    pub fn pending(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }
}
