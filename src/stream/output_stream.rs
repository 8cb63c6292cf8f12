//! Buffered output stream.
//!
//! This module provides [BufferedOutputStream], which accumulates writes in a
//! [ByteBuffer] and hands them to a [ByteSink] in large blocks.
//!
//! Data reaches the sink when:
//! - a write does not fit into the remaining buffer space,
//! - [flush](BufferedOutputStream::flush) is called,
//! - [close](BufferedOutputStream::close) is called.
//!
//! **Important:** Data still buffered is lost if the stream is dropped
//! without calling `flush` or `close`. Such a drop is logged as a warning.

use std::io::{self, Write};
use std::ops::{Deref, DerefMut};

use log::{debug, trace, warn};

use crate::sink::ByteSink;
use crate::stream::byte_buffer::ByteBuffer;
use crate::stream::stream_config::StreamConfig;
use crate::stream::stream_error::StreamError;

// =#========================================================================#=
// BUFFERED OUTPUT STREAM
// =#========================================================================#=
/// A buffered writer over a [ByteSink].
///
/// The sink may refuse a drain by consuming nothing. Writes never wait for
/// it: refused data stays buffered and the buffer grows to take the new
/// bytes as well. Only [flush](BufferedOutputStream::flush) retries until the
/// sink has taken everything.
///
/// Over a `Vec<u8>` sink the stream doubles as an in-memory byte builder:
/// ```
/// use std::io::Write;
/// use bufstreams::BufferedOutputStream;
///
/// let mut out = BufferedOutputStream::in_memory();
/// write!(out, "Hello")?;
/// write!(out, " World")?;
/// assert_eq!(out.take()?, b"Hello World");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct BufferedOutputStream<K: ByteSink> {
    sink: K,
    buffer: PendingBuffer,
    config: StreamConfig,
    closed: bool,
}

impl BufferedOutputStream<Vec<u8>> {
    /// Creates a stream collecting everything into memory.
    pub fn in_memory() -> Self {
        Self::new(Vec::new())
    }

    /// Flushes and returns everything written so far, leaving the stream
    /// empty but usable.
    pub fn take(&mut self) -> Result<Vec<u8>, StreamError> {
        self.flush()?;
        Ok(std::mem::take(&mut self.sink))
    }
}

impl<K: ByteSink> BufferedOutputStream<K> {
    /// Creates a stream with the default configuration.
    pub fn new(sink: K) -> Self {
        Self::build(sink, StreamConfig::default())
    }

    /// Creates a stream with an initial buffer of `capacity` bytes.
    ///
    /// # Errors
    /// [StreamError::InvalidCapacity] if `capacity` is zero.
    pub fn with_capacity(capacity: usize, sink: K) -> Result<Self, StreamError> {
        Self::with_config(StreamConfig::default().with_capacity(capacity), sink)
    }

    /// Creates a stream from a full configuration.
    ///
    /// # Errors
    /// Any error of [StreamConfig::validate].
    pub fn with_config(config: StreamConfig, sink: K) -> Result<Self, StreamError> {
        config.validate()?;
        Ok(Self::build(sink, config))
    }

    fn build(sink: K, config: StreamConfig) -> Self {
        Self {
            sink,
            buffer: PendingBuffer(ByteBuffer::with_capacity(config.capacity())),
            config,
            closed: false,
        }
    }

    pub fn get_ref(&self) -> &K {
        &self.sink
    }

    /// Returns a mutable reference to the sink.
    ///
    /// Writing to the sink directly may reorder data relative to what is
    /// still buffered.
    pub fn get_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Consumes the stream and returns the sink. Buffered bytes are lost.
    pub fn into_inner(self) -> K {
        self.sink
    }

    /// Read-only view of the internal buffer.
    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer.0
    }

    /// The bytes written but not yet drained.
    pub fn pending(&self) -> &[u8] {
        self.buffer.unread()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Current buffer capacity; larger than configured after backpressure growth.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // --- Writing ---

    /// Appends `data`, draining to the sink as needed.
    ///
    /// # Returns
    /// Always `data.len()`: every byte is either drained or buffered.
    ///
    /// # Errors
    /// Sink I/O failures, [StreamError::PartialDrain] if the sink breaks its
    /// contract, [StreamError::CapacityExceeded] if refused data would grow
    /// the buffer past its maximum, [StreamError::Closed] after close.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize, StreamError> {
        self.check_open()?;
        if data.is_empty() {
            return Ok(0);
        }

        if data.len() > self.buffer.free() {
            self.drain_buffered(false)?;
        }

        if data.len() > self.buffer.free()
            && self.buffer.is_empty()
            && data.len() > self.buffer.capacity()
            && self.drain_direct(data)?
        {
            return Ok(data.len());
        }

        if data.len() > self.buffer.free() {
            // Sink pushed back: keep everything, grow instead of waiting
            let required = self.buffer.limit() + data.len();
            let capacity = self.config.grown_capacity(self.buffer.capacity(), required)?;
            debug!(
                "growing output buffer from {} to {capacity} bytes",
                self.buffer.capacity()
            );
            self.buffer.grow(capacity)?;
        }

        self.buffer.append(data);
        Ok(data.len())
    }

    /// Appends a single byte.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), StreamError> {
        self.write_bytes(&[byte])?;
        Ok(())
    }

    /// Drains the buffer until the sink has taken all of it, then asks the
    /// sink to push the data on to its destination ([ByteSink::flush]).
    ///
    /// Retries as long as the sink consumes nothing, unless
    /// [StreamConfig::with_max_flush_retries] bounds the number of attempts.
    ///
    /// # Errors
    /// Sink I/O failures, [StreamError::PartialDrain],
    /// [StreamError::FlushStalled] once the retry bound is hit,
    /// [StreamError::Closed] after close.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        self.check_open()?;
        self.flush_buffered()?;
        self.sink.flush()?;
        Ok(())
    }

    fn flush_buffered(&mut self) -> Result<(), StreamError> {
        let mut stalls = 0;
        while !self.buffer.is_empty() {
            if self.drain_buffered(false)? {
                stalls = 0;
                continue;
            }

            stalls += 1;
            match self.config.max_flush_retries() {
                Some(max) if stalls > max => {
                    warn!("giving up flush after {stalls} refused drains");
                    return Err(StreamError::FlushStalled { attempts: stalls });
                }
                _ => {}
            }
            trace!("sink refused {} bytes, retrying", self.buffer.available());
            std::thread::yield_now();
        }
        Ok(())
    }

    /// Offers the buffered region to the sink once.
    ///
    /// # Returns
    /// `true` if the sink took the region, `false` if it refused it.
    fn drain_buffered(&mut self, is_final: bool) -> Result<bool, StreamError> {
        let offered = self.buffer.available();
        if offered == 0 && !is_final {
            return Ok(true);
        }

        let consumed = self.sink.drain(self.buffer.unread(), is_final)?;
        match consumed {
            0 if offered > 0 => Ok(false),
            n if n == offered => {
                trace!("drained {n} bytes");
                self.buffer.consume(n);
                let start = self.buffer.start();
                self.buffer.shift_to_front(start);
                Ok(true)
            }
            n => Err(StreamError::PartialDrain {
                consumed: n,
                offered,
            }),
        }
    }

    /// Hands `data` to the sink without buffering it.
    ///
    /// # Returns
    /// `true` if the sink took it, `false` if it refused.
    fn drain_direct(&mut self, data: &[u8]) -> Result<bool, StreamError> {
        match self.sink.drain(data, false)? {
            0 => Ok(false),
            n if n == data.len() => {
                debug!("wrote {n} bytes bypassing the buffer");
                Ok(true)
            }
            n => Err(StreamError::PartialDrain {
                consumed: n,
                offered: data.len(),
            }),
        }
    }

    // --- Closing ---

    /// Flushes, signals the final drain to the sink and closes it.
    ///
    /// The sink is closed even if flushing failed; the first failure is
    /// reported. Closing again is a no-op.
    pub fn close(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!("closing output stream with {} bytes pending", self.buffer.available());

        let finished = self.flush_buffered().and_then(|()| self.finish());
        if finished.is_err() {
            self.buffer.clear();
        }
        let closed = self.sink.close().map_err(StreamError::from);
        finished.and(closed)
    }

    /// Final drain with `is_final` set. The buffer is empty after a flush,
    /// so the sink only sees the end-of-data signal.
    fn finish(&mut self) -> Result<(), StreamError> {
        self.drain_buffered(true)?;
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
// PENDING BUFFER
// =#========================================================================#=
/// The output buffer; warns when dropped while still holding undrained bytes.
///
/// A successful or failed close always leaves it empty, so only streams
/// dropped (or unwrapped with `into_inner`) before closing trigger it.
#[derive(Debug)]
struct PendingBuffer(ByteBuffer);

impl Deref for PendingBuffer {
    type Target = ByteBuffer;

    fn deref(&self) -> &ByteBuffer {
        &self.0
    }
}

impl DerefMut for PendingBuffer {
    fn deref_mut(&mut self) -> &mut ByteBuffer {
        &mut self.0
    }
}

impl Drop for PendingBuffer {
    fn drop(&mut self) {
        if !self.0.is_empty() {
            warn!(
                "output stream dropped with {} undrained bytes, call close() first",
                self.0.available()
            );
        }
    }
}

// =#========================================================================#=
// STD INTEGRATION
// =#========================================================================#=
impl<K: ByteSink> Write for BufferedOutputStream<K> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(BufferedOutputStream::flush(self)?)
    }
}
