use bytes::{Bytes, BytesMut};

/// Accumulates the audio chunks of one spoken answer.
#[derive(Debug, Default)]
pub struct AnswerBuffer {
    data: BytesMut,
}

impl AnswerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Hands over everything buffered so far and starts a fresh answer.
    pub fn take(&mut self) -> Bytes {
        self.data.split().freeze()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_returns_all_chunks_and_clears() {
        let mut buffer = AnswerBuffer::new();
        buffer.extend(b"abc");
        buffer.extend(b"def");
        assert_eq!(buffer.len(), 6);

        let taken = buffer.take();
        assert_eq!(&taken[..], b"abcdef");
        assert!(buffer.is_empty());

        buffer.extend(b"xy");
        assert_eq!(&buffer.take()[..], b"xy");
    }
}
