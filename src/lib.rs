//! Bufstreams is a library of buffered byte streams for incremental parsing
//! and writing.
//!
//! This crate stages data between a caller and an arbitrary byte producer or
//! consumer, so that many small reads and writes cost few calls to the
//! underlying I/O.
//! Core functionality provided:
//! - [BufferedInputStream]: reads, peeks and skips over any [ByteSource].
//!   - Anchors: mark a position and the stream keeps every byte from there
//!     on across refills, so a token straddling a refill boundary can be
//!     borrowed in one piece without copying it aside.
//!   - Sticky end of stream: a source reporting no data is not asked again.
//! - [BufferedOutputStream]: accumulates writes for any [ByteSink].
//!   - Sinks may push back by consuming nothing; writes then keep the data
//!     buffered, flushes retry.
//!   - Over a `Vec<u8>` it is an in-memory byte builder.
//! - Capabilities: [ByteSource] and [ByteSink] are single-method traits.
//!   Adapters exist for in-memory data ([InMemorySource], `&[u8]`,
//!   `Vec<u8>`) and for any [std::io::Read] / [std::io::Write]
//!   ([ReaderSource], [WriterSink]).
//! - Configurability: initial capacity, growth factor, maximum capacity and
//!   flush retries via [StreamConfig].
//!
//! Limitations:
//! - Single anchor per stream; anchoring again moves it
//! - Synchronous and single-threaded; concurrent use needs external locking
//!
//! # Usage patterns
//!
//! ## Reading with anchors
//! ```
//! use bufstreams::{BufferedInputStream, StreamConfig};
//!
//! // Tiny buffer to force refills inside the word
//! let config = StreamConfig::default().with_capacity(4);
//! let mut stream = BufferedInputStream::with_config(config, &b"say hello!"[..])?;
//!
//! stream.skip(4)?;
//! stream.anchor();
//! while stream.peek()?.is_some_and(|b| b.is_ascii_alphabetic()) {
//!     stream.read_byte()?;
//! }
//! assert_eq!(stream.take_anchored()?, b"hello");
//! # Ok::<(), bufstreams::StreamError>(())
//! ```
//!
//! ## Writing to a file
//! ```no_run
//! use bufstreams::{BufferedOutputStream, WriterSink};
//!
//! let mut out = BufferedOutputStream::new(WriterSink::create("out.bin")?);
//! out.write_bytes(b"header")?;
//! out.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod sink;
pub mod source;
pub mod stream;

pub use sink::{ByteSink, WriterSink};
pub use source::{ByteSource, InMemorySource, ReaderSource};
pub use stream::{BufferedInputStream, BufferedOutputStream, StreamConfig, StreamError};

use std::fs::File;
use std::path::Path;

// ============================================================================
// Quick file API
// ============================================================================
/// Opens a file for buffered reading with default settings.
///
/// # Errors
/// Returns an error if the file cannot be opened.
pub fn open_file<P: AsRef<Path>>(
    path: P,
) -> Result<BufferedInputStream<ReaderSource<File>>, StreamError> {
    Ok(BufferedInputStream::new(ReaderSource::open(path)?))
}

/// Creates (or truncates) a file for buffered writing with default settings.
///
/// # Errors
/// Returns an error if the file cannot be created.
pub fn create_file<P: AsRef<Path>>(
    path: P,
) -> Result<BufferedOutputStream<WriterSink<File>>, StreamError> {
    Ok(BufferedOutputStream::new(WriterSink::create(path)?))
}
