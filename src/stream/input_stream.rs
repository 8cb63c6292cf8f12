//! Buffered input stream with anchoring.
//!
//! This module provides [BufferedInputStream], which stages the bytes of a
//! [ByteSource] in a [ByteBuffer] so that byte-by-byte consumption does not
//! cost one source call per byte.
//!
//! # Anchors
//! When parsing incrementally, a token may straddle two refills. Instead of
//! copying partial matches into a side buffer, the parser anchors the stream
//! where the token starts. Refills then keep every byte from the anchor
//! onwards, shifting it to the front of the buffer (or growing the buffer if
//! the anchored run fills it), so the whole token can be borrowed with
//! [BufferedInputStream::anchored_slice] or taken with
//! [BufferedInputStream::take_anchored] once the parser is done with it.
//!
//! ```
//! use bufstreams::BufferedInputStream;
//!
//! let mut stream = BufferedInputStream::from_bytes(b"ab 123 cd 45");
//! let mut numbers = Vec::new();
//! while let Some(b) = stream.peek()? {
//!     if b.is_ascii_digit() {
//!         if !stream.is_anchored() {
//!             stream.anchor();
//!         }
//!     } else if stream.is_anchored() {
//!         numbers.push(stream.take_anchored()?);
//!     }
//!     stream.read_byte()?;
//! }
//! if stream.is_anchored() {
//!     numbers.push(stream.take_anchored()?);
//! }
//! assert_eq!(numbers, vec![b"123".to_vec(), b"45".to_vec()]);
//! # Ok::<(), bufstreams::StreamError>(())
//! ```

use std::io::{self, BufRead, Read};

use log::{debug, trace};

use crate::source::{ByteSource, InMemorySource};
use crate::stream::byte_buffer::ByteBuffer;
use crate::stream::stream_config::StreamConfig;
use crate::stream::stream_error::StreamError;

// =#========================================================================#=
// BUFFERED INPUT STREAM
// =#========================================================================#=
/// A buffered reader over a [ByteSource] supporting peeking and anchoring.
///
/// # Features
/// - Single-byte and bulk reads, peeks and skips, served from the buffer
/// - Sticky end-of-stream: once the source reports no data, it is not asked
///   again until [reset_eof](BufferedInputStream::reset_eof)
/// - Anchors that survive refills, for zero-copy token extraction
/// - Implements [Read], [BufRead] and [ByteSource], so streams stack
///
/// Not safe for concurrent use; each stream belongs to one thread of control.
#[derive(Debug)]
pub struct BufferedInputStream<S: ByteSource> {
    source: S,
    buffer: ByteBuffer,
    config: StreamConfig,
    /// Stream-absolute offset of `buffer` index 0
    offset: u64,
    /// Source reported no more data on the last fill attempt
    at_eof: bool,
    closed: bool,
}

impl BufferedInputStream<InMemorySource> {
    /// Creates a stream over a copy of `bytes` with default configuration.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(InMemorySource::from_bytes(bytes))
    }

    /// Creates a stream over `bytes` with default configuration.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::new(InMemorySource::from_vec(bytes))
    }
}

impl<S: ByteSource> BufferedInputStream<S> {
    /// Creates a stream with the default configuration.
    pub fn new(source: S) -> Self {
        Self::build(source, StreamConfig::default())
    }

    /// Creates a stream with an initial buffer of `capacity` bytes.
    ///
    /// # Errors
    /// [StreamError::InvalidCapacity] if `capacity` is zero.
    pub fn with_capacity(capacity: usize, source: S) -> Result<Self, StreamError> {
        Self::with_config(StreamConfig::default().with_capacity(capacity), source)
    }

    /// Creates a stream from a full configuration.
    ///
    /// # Errors
    /// Any error of [StreamConfig::validate].
    pub fn with_config(config: StreamConfig, source: S) -> Result<Self, StreamError> {
        config.validate()?;
        Ok(Self::build(source, config))
    }

    fn build(source: S, config: StreamConfig) -> Self {
        Self {
            source,
            buffer: ByteBuffer::with_capacity(config.capacity()),
            config,
            offset: 0,
            at_eof: false,
            closed: false,
        }
    }

    // --- Accessors ---

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Returns a mutable reference to the source.
    ///
    /// Reading from the source directly skips over whatever is buffered.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consumes the stream and returns the source. Buffered bytes are lost.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Read-only view of the internal buffer.
    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Current buffer capacity; larger than configured after anchor growth.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Stream-absolute offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.offset + self.buffer.start() as u64
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // --- Refill ---

    /// Makes at least `n` unread bytes available, unless the source runs dry.
    ///
    /// # Returns
    /// The number of unread bytes now buffered: at least `n`, or fewer only
    /// at end of stream.
    ///
    /// # Errors
    /// Source I/O failures, [StreamError::SourceOverrun] if the source
    /// breaks its contract, [StreamError::CapacityExceeded] if `n` or the
    /// anchored data cannot fit, [StreamError::Closed] after close.
    pub fn ensure(&mut self, n: usize) -> Result<usize, StreamError> {
        self.check_open()?;
        loop {
            let available = self.buffer.available();
            if available >= n || self.at_eof {
                return Ok(available);
            }
            self.refill(n - available)?;
        }
    }

    /// One refill attempt for `needed` more bytes.
    ///
    /// The source fills whatever room is free. The buffer grows by a single
    /// step only when no room is left, so end of stream stops the growth.
    fn refill(&mut self, needed: usize) -> Result<(), StreamError> {
        let keep_from = self.buffer.anchor().unwrap_or(self.buffer.start());
        let shifted = self.buffer.shift_to_front(keep_from);
        if shifted > 0 {
            self.offset += shifted as u64;
            trace!("shifted buffer down by {shifted} bytes");
        }

        // One growth step per refill, only once the kept run fills the buffer
        if self.buffer.free() == 0 {
            let required = self.buffer.capacity().saturating_add(1);
            let capacity = self.config.grown_capacity(self.buffer.capacity(), required)?;
            debug!(
                "growing input buffer from {} to {capacity} bytes (anchored: {}, wanted: {needed})",
                self.buffer.capacity(),
                self.buffer.anchor().is_some()
            );
            self.buffer.grow(capacity)?;
        }

        let spare = self.buffer.spare_mut();
        let requested = spare.len();
        let written = self.source.fill(spare)?;
        if written > requested {
            return Err(StreamError::SourceOverrun {
                returned: written,
                requested,
            });
        }

        trace!("filled {written} of {requested} bytes");
        if written == 0 {
            self.at_eof = true;
        } else {
            self.buffer.commit(written);
        }
        Ok(())
    }

    // --- Reading ---

    /// Returns `true` if no buffered byte is left and the source is exhausted.
    pub fn eof(&mut self) -> Result<bool, StreamError> {
        Ok(self.ensure(1)? == 0)
    }

    /// Allows the source to be asked for data again after it reported end
    /// of stream, e.g. for sources that are appended to over time.
    pub fn reset_eof(&mut self) {
        self.at_eof = false;
    }

    /// Consumes and returns the next byte, or `None` at end of stream.
    #[inline]
    pub fn read_byte(&mut self) -> Result<Option<u8>, StreamError> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.buffer.consume(1);
        }
        Ok(byte)
    }

    /// Returns the next byte without consuming it, or `None` at end of stream.
    #[inline]
    pub fn peek(&mut self) -> Result<Option<u8>, StreamError> {
        if self.ensure(1)? == 0 {
            return Ok(None);
        }
        Ok(self.buffer.unread().first().copied())
    }

    /// Returns up to `n` bytes from the current position without consuming them.
    ///
    /// The slice is shorter than `n` only at end of stream. The buffer grows
    /// if `n` exceeds its capacity.
    pub fn peek_slice(&mut self, n: usize) -> Result<&[u8], StreamError> {
        let available = self.ensure(n)?;
        Ok(&self.buffer.unread()[..available.min(n)])
    }

    /// Consumes up to `count` bytes and returns them; fewer only at end of stream.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, StreamError> {
        let mut out = Vec::with_capacity(count.min(self.buffer.capacity()));
        while out.len() < count {
            if self.ensure(1)? == 0 {
                break;
            }
            let take = (count - out.len()).min(self.buffer.available());
            out.extend_from_slice(&self.buffer.unread()[..take]);
            self.buffer.consume(take);
        }
        Ok(out)
    }

    /// Reads into `out`, returning the number of bytes copied (`0` at end of stream).
    ///
    /// Requests at least as large as the buffer go straight to the source
    /// when nothing is buffered and no anchor has to be maintained.
    pub fn read_into(&mut self, out: &mut [u8]) -> Result<usize, StreamError> {
        self.check_open()?;
        if out.is_empty() {
            return Ok(0);
        }

        if self.buffer.is_empty()
            && self.buffer.anchor().is_none()
            && !self.at_eof
            && out.len() >= self.buffer.capacity()
        {
            return self.read_direct(out);
        }

        if self.ensure(1)? == 0 {
            return Ok(0);
        }
        let n = out.len().min(self.buffer.available());
        out[..n].copy_from_slice(&self.buffer.unread()[..n]);
        self.buffer.consume(n);
        Ok(n)
    }

    fn read_direct(&mut self, out: &mut [u8]) -> Result<usize, StreamError> {
        let position = self.position();
        self.buffer.clear();

        let requested = out.len();
        let written = self.source.fill(out)?;
        if written > requested {
            self.offset = position;
            return Err(StreamError::SourceOverrun {
                returned: written,
                requested,
            });
        }

        debug!("read {written} bytes bypassing the buffer");
        if written == 0 {
            self.at_eof = true;
        }
        self.offset = position + written as u64;
        Ok(written)
    }

    /// Skips up to `n` bytes and returns how many were skipped; fewer only
    /// at end of stream.
    pub fn skip(&mut self, n: usize) -> Result<usize, StreamError> {
        let mut skipped = 0;
        while skipped < n {
            if self.ensure(1)? == 0 {
                break;
            }
            let step = (n - skipped).min(self.buffer.available());
            self.buffer.consume(step);
            skipped += step;
        }
        Ok(skipped)
    }

    // --- Anchors ---

    /// Anchors the stream at the current position, replacing any previous anchor.
    ///
    /// From here on, refills keep every byte from the anchor onwards.
    pub fn anchor(&mut self) {
        self.buffer.set_anchor();
    }

    pub fn is_anchored(&self) -> bool {
        self.buffer.anchor().is_some()
    }

    /// Removes the anchor and returns its stream-absolute offset.
    ///
    /// `position() - upanchor()?` is the length of the anchored run.
    ///
    /// # Errors
    /// [StreamError::NotAnchored] if no anchor is set, [StreamError::Closed]
    /// after close.
    pub fn upanchor(&mut self) -> Result<u64, StreamError> {
        self.check_open()?;
        let anchor = self.buffer.clear_anchor().ok_or(StreamError::NotAnchored)?;
        Ok(self.offset + anchor as u64)
    }

    /// Borrows the bytes from the anchor up to the current position.
    ///
    /// # Errors
    /// [StreamError::NotAnchored] if no anchor is set, [StreamError::Closed]
    /// after close.
    pub fn anchored_slice(&self) -> Result<&[u8], StreamError> {
        self.check_open()?;
        self.buffer.anchored().ok_or(StreamError::NotAnchored)
    }

    /// Copies out the bytes from the anchor up to the current position and
    /// removes the anchor.
    ///
    /// # Errors
    /// Same as [BufferedInputStream::anchored_slice].
    pub fn take_anchored(&mut self) -> Result<Vec<u8>, StreamError> {
        let bytes = self.anchored_slice()?.to_vec();
        self.buffer.clear_anchor();
        Ok(bytes)
    }

    // --- Closing ---

    /// Closes the stream and the source. Closing again is a no-op.
    ///
    /// Buffered bytes are discarded; later reads fail with [StreamError::Closed].
    pub fn close(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        debug!("closing input stream at position {}", self.position());
        self.closed = true;
        self.buffer.clear();
        self.source.close()?;
        Ok(())
    }

    fn check_open(&self) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        Ok(())
    }
}

// =#========================================================================#=
// STD AND SOURCE INTEGRATION
// =#========================================================================#=
impl<S: ByteSource> Read for BufferedInputStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

impl<S: ByteSource> BufRead for BufferedInputStream<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.ensure(1)?;
        Ok(self.buffer.unread())
    }

    fn consume(&mut self, amt: usize) {
        let amt = amt.min(self.buffer.available());
        self.buffer.consume(amt);
    }
}

impl<S: ByteSource> ByteSource for BufferedInputStream<S> {
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(BufferedInputStream::close(self)?)
    }
}
