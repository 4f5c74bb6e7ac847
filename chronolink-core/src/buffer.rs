//! Buffer for unsolicited sentences observed while servicing other commands
//!
//! Instruments broadcast position/time sentences on their own schedule, so
//! the drain loop routinely reads lines that belong to no command. They are
//! parked here and handed out only when the caller explicitly drains the
//! buffer; they are never silently discarded.

use std::sync::Arc;

use crate::{constants::SENTENCE_BUFFER_CAPACITY, error::Error};

/// Per-device queue of unsolicited sentences
///
/// Thread-safe and cheap to clone (Arc internally), so the link's drain
/// loop and the caller can hold the same buffer.
#[derive(Debug, Clone)]
pub struct SentenceBuffer {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    capacity: usize,
    sentences: parking_lot::Mutex<Vec<String>>,
}

impl SentenceBuffer {
    /// Create a buffer with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(SENTENCE_BUFFER_CAPACITY)
    }

    /// Create a buffer holding at most `capacity` sentences
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                capacity,
                sentences: parking_lot::Mutex::new(Vec::new()),
            }),
        }
    }

    /// Append a sentence in arrival order
    ///
    /// # Errors
    ///
    /// Fails with [`Error::BufferOverflow`] when the capacity is reached.
    /// Losing sentences silently would defeat the buffer's purpose, so the
    /// overflow is loud and the caller decides what to do.
    pub fn push(&self, sentence: impl Into<String>) -> Result<(), Error> {
        let mut sentences = self.inner.sentences.lock();

        if sentences.len() >= self.inner.capacity {
            return Err(Error::BufferOverflow {
                capacity: self.inner.capacity,
            });
        }

        sentences.push(sentence.into());
        Ok(())
    }

    /// Return all buffered sentences in arrival order and clear the buffer
    ///
    /// The read-and-clear is atomic with respect to concurrent `push`; a
    /// second drain with no intervening push returns an empty vec.
    pub fn drain_all(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.sentences.lock())
    }

    /// Number of buffered sentences
    pub fn len(&self) -> usize {
        self.inner.sentences.lock().len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SentenceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn push_preserves_arrival_order() {
        let buffer = SentenceBuffer::new();
        buffer.push("$GPGGA,1*00").unwrap();
        buffer.push("$GPRMC,2*00").unwrap();

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.drain_all(), vec!["$GPGGA,1*00", "$GPRMC,2*00"]);
    }

    #[test]
    fn drain_all_is_idempotent() {
        let buffer = SentenceBuffer::new();
        buffer.push("$GPGGA,1*00").unwrap();

        assert_eq!(buffer.drain_all().len(), 1);
        assert_eq!(buffer.drain_all(), Vec::<String>::new());
    }

    #[test]
    fn overflow_fails_loudly() {
        let buffer = SentenceBuffer::with_capacity(2);
        buffer.push("$a").unwrap();
        buffer.push("$b").unwrap();

        let err = buffer.push("$c").unwrap_err();
        assert_eq!(err, Error::BufferOverflow { capacity: 2 });

        // The buffered sentences survive the failed push
        assert_eq!(buffer.drain_all(), vec!["$a", "$b"]);
    }

    #[test]
    fn clones_share_storage() {
        let buffer = SentenceBuffer::new();
        let other = buffer.clone();
        buffer.push("$GPGGA").unwrap();

        assert_eq!(other.drain_all(), vec!["$GPGGA"]);
        assert!(buffer.is_empty());
    }
}
