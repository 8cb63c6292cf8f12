//! Reader-backed implementation of a byte source.
//!
//! This module provides [ReaderSource], which adapts any [Read] (files,
//! sockets, pipes) to the [ByteSource] contract. Use this to put a
//! [BufferedInputStream](crate::stream::BufferedInputStream) in front of
//! real I/O.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use crate::source::byte_source::ByteSource;

// =#========================================================================#=
// READER SOURCE
// =#========================================================================$=
/// A byte source pulling its data from a [Read] implementation.
///
/// Closing the source drops the reader, which releases file handles or
/// sockets immediately instead of when the stream goes out of scope.
#[derive(Debug)]
pub struct ReaderSource<R: Read> {
    /// Underlying reader, `None` once closed
    reader: Option<R>,
}

impl ReaderSource<File> {
    /// Creates a new reader source from a file path.
    ///
    /// # Arguments
    /// * `path` - Path to the file (accepting `&str`, `String`, `Path`, or `PathBuf`)
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> ReaderSource<R> {
    /// Wraps a reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }

    /// Returns a reference to the reader, unless the source has been closed.
    pub fn get_ref(&self) -> Option<&R> {
        self.reader.as_ref()
    }

    /// Returns `true` once [ByteSource::close] has been called.
    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Consumes the source and returns the reader, unless already closed.
    pub fn into_inner(self) -> Option<R> {
        self.reader
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(0);
        };

        loop {
            match reader.read(buf) {
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.reader = None;
        Ok(())
    }
}
