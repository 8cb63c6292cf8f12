//! In-memory implementation of a byte source.

use crate::source::byte_source::ByteSource;
use std::io;

// =#========================================================================#=
// IN MEMORY SOURCE
// =#========================================================================$=
/// An in-memory byte source that owns its data.
///
/// Useful to wrap a byte array in a buffered stream, e.g. to feed the same
/// parser from memory that otherwise reads from a file.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    /// The owned byte data being served
    input: Vec<u8>,
    /// Number of bytes already handed out
    pos: usize,
}

impl InMemorySource {
    /// Creates a new in-memory source from a Vec of bytes.
    ///
    /// # Arguments
    /// * `bytes` - The byte vector to serve
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            input: bytes,
            pos: 0,
        }
    }

    /// Creates a new in-memory source by copying a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }

    /// Number of bytes not yet handed out.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Consumes the source and returns the full underlying data.
    pub fn into_inner(self) -> Vec<u8> {
        self.input
    }
}

impl From<Vec<u8>> for InMemorySource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl From<&str> for InMemorySource {
    fn from(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }
}

impl ByteSource for InMemorySource {
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let end = (self.pos + buf.len()).min(self.input.len());
        let n = end - self.pos;
        buf[..n].copy_from_slice(&self.input[self.pos..end]);
        self.pos = end;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::InMemorySource;
    use crate::source::ByteSource;

    #[test]
    fn test_in_memory_source_serves_everything_once() {
        let mut source = InMemorySource::from("hello");
        let mut buf = [0u8; 3];

        assert_eq!(source.fill(&mut buf).unwrap(), 3);
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.fill(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"lo");
        assert_eq!(source.fill(&mut buf).unwrap(), 0);
        assert_eq!(source.into_inner(), b"hello");
    }
}
