//! Source capability for buffered input.
//!
//! This module provides the [ByteSource] trait, the single narrow contract a
//! [BufferedInputStream](crate::stream::BufferedInputStream) needs from
//! whatever produces its bytes.

use std::io;

// =#========================================================================#=
// BYTE SOURCE (Trait)
// =#========================================================================#=
/// Trait defining the interface of anything that can produce bytes for a
/// buffered input stream.
///
/// This trait abstracts over different ways of producing byte data:
/// - In-memory byte slices and vectors
/// - Readers such as files or sockets (see [ReaderSource](crate::source::ReaderSource))
/// - Other buffered input streams (streams stack)
///
/// The stream only calls [ByteSource::fill] when its buffer cannot satisfy a
/// request, so implementations may be as expensive per call as they like.
pub trait ByteSource {
    /// Writes new data to the front of `buf`.
    ///
    /// `buf` is the free region of the caller's buffer and is never empty.
    ///
    /// # Arguments
    /// * `buf` - The region to fill; nothing outside of it may be touched
    ///
    /// # Returns
    /// The number of bytes written, at most `buf.len()`. Returning `0` means
    /// that no more data is available right now (end of stream).
    ///
    /// # Errors
    /// Any I/O failure of the underlying producer.
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Releases the underlying resource, if there is one.
    ///
    /// Buffered streams call this at most once.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).fill(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    #[inline]
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).fill(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Borrowed slices serve their bytes in order and shrink as they go.
impl ByteSource for &[u8] {
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        Ok(n)
    }
}
