//! Capacity-bounded line storage.
//!
//! The accumulator never relies on callers to check length before appending:
//! [`LineBuffer::try_push`] refuses the byte once the buffer is full and the
//! caller decides what an overflow means.
use bytes::BytesMut;
use std::borrow::Cow;

/// Returned by [`LineBuffer::try_push`] when the buffer is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full;

/// Owned byte buffer that never grows beyond `capacity`.
#[derive(Debug)]
pub struct LineBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one byte, or report [`Full`] without touching the contents.
    pub fn try_push(&mut self, byte: u8) -> Result<(), Full> {
        if self.is_full() {
            return Err(Full);
        }
        self.buf.extend_from_slice(&[byte]);
        Ok(())
    }

    /// Remove and return the last byte, if any.
    pub fn pop(&mut self) -> Option<u8> {
        let last = *self.buf.last()?;
        self.buf.truncate(self.buf.len() - 1);
        Some(last)
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Contents as text, borrowed unless invalid UTF-8 had to be replaced.
    /// The accumulator only pushes bytes in `[32,127]`, so it always borrows.
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_push_past_capacity() {
        let mut b = LineBuffer::new(3);
        for byte in b"abc" {
            assert!(b.try_push(*byte).is_ok());
        }
        assert!(b.is_full());
        assert_eq!(b.try_push(b'd'), Err(Full));
        assert_eq!(b.as_bytes(), b"abc");
        assert_eq!(b.len(), b.capacity());
    }

    #[test]
    fn pop_and_clear() {
        let mut b = LineBuffer::new(4);
        assert_eq!(b.pop(), None);
        b.try_push(b'x').unwrap();
        b.try_push(b'y').unwrap();
        assert_eq!(b.pop(), Some(b'y'));
        assert!(matches!(b.to_str_lossy(), Cow::Borrowed("x")));
        b.clear();
        assert!(b.is_empty());
    }
}
