//! Sink capability for buffered output.
//!
//! This module provides the [ByteSink] trait, the single narrow contract a
//! [BufferedOutputStream](crate::stream::BufferedOutputStream) needs from
//! whatever consumes its bytes.

use std::io;

// =#========================================================================#=
// BYTE SINK (Trait)
// =#========================================================================#=
/// Trait defining the interface of anything that can consume bytes drained
/// from a buffered output stream.
///
/// A sink either takes the whole region offered to it or nothing at all.
/// Returning `0` for a non-empty region is backpressure: the stream keeps the
/// bytes and offers them again later.
pub trait ByteSink {
    /// Consumes the bytes of `buf`.
    ///
    /// # Arguments
    /// * `buf` - The buffered region, to be consumed as a whole
    /// * `is_final` - `true` if no further writes will arrive; use it to
    ///   finalize the underlying resource (final block, trailer, flush).
    ///   May be seen more than once and must stay harmless if it is.
    ///
    /// # Returns
    /// Either `buf.len()` or `0`. Any other value is a contract violation
    /// reported by the stream as
    /// [StreamError::PartialDrain](crate::stream::StreamError::PartialDrain).
    ///
    /// # Errors
    /// Any I/O failure of the underlying consumer.
    fn drain(&mut self, buf: &[u8], is_final: bool) -> io::Result<usize>;

    /// Pushes everything drained so far on to the final destination.
    ///
    /// Called by [BufferedOutputStream::flush](crate::stream::BufferedOutputStream::flush)
    /// after the buffer was drained. Sinks that forward data immediately
    /// keep the default no-op.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Releases the underlying resource, if there is one.
    ///
    /// Buffered streams call this at most once, after all pending data
    /// was drained.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<K: ByteSink + ?Sized> ByteSink for &mut K {
    #[inline]
    fn drain(&mut self, buf: &[u8], is_final: bool) -> io::Result<usize> {
        (**self).drain(buf, is_final)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<K: ByteSink + ?Sized> ByteSink for Box<K> {
    #[inline]
    fn drain(&mut self, buf: &[u8], is_final: bool) -> io::Result<usize> {
        (**self).drain(buf, is_final)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Vectors accept everything and append it.
impl ByteSink for Vec<u8> {
    fn drain(&mut self, buf: &[u8], _is_final: bool) -> io::Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }
}
