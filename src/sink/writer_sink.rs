//! Writer-backed implementation of a byte sink.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sink::byte_sink::ByteSink;

// =#========================================================================#=
// WRITER SINK
// =#========================================================================$=
/// A byte sink pushing its data into a [Write] implementation.
///
/// Every drain is written out completely, so the sink never applies
/// backpressure; a failing writer surfaces as an I/O error instead. The
/// writer is flushed on [ByteSink::flush], on the final drain and on close,
/// where it is also dropped.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    /// Underlying writer, `None` once closed
    writer: Option<W>,
}

impl WriterSink<File> {
    /// Creates (or truncates) the file at `path` and writes into it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> WriterSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
        }
    }

    /// Returns a reference to the writer, unless the sink has been closed.
    pub fn get_ref(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    /// Returns `true` once [ByteSink::close] has been called.
    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    /// Consumes the sink and returns the writer, unless already closed.
    pub fn into_inner(self) -> Option<W> {
        self.writer
    }
}

impl<W: Write> ByteSink for WriterSink<W> {
    fn drain(&mut self, buf: &[u8], is_final: bool) -> io::Result<usize> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "writer sink already closed",
            ));
        };

        writer.write_all(buf)?;
        if is_final {
            writer.flush()?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WriterSink;
    use crate::sink::ByteSink;
    use std::io::BufWriter;

    #[test]
    fn test_writer_sink_writes_whole_region() {
        let mut sink = WriterSink::new(Vec::new());
        assert_eq!(sink.drain(b"abc", false).unwrap(), 3);
        assert_eq!(sink.drain(b"", true).unwrap(), 0);
        assert_eq!(sink.get_ref().unwrap().as_slice(), b"abc");
    }

    #[test]
    fn test_writer_sink_flush_reaches_inner_writer() {
        let mut sink = WriterSink::new(BufWriter::with_capacity(64, Vec::new()));
        sink.drain(b"abc", false).unwrap();
        assert!(sink.get_ref().unwrap().get_ref().is_empty());

        sink.flush().unwrap();
        assert_eq!(sink.get_ref().unwrap().get_ref().as_slice(), b"abc");
    }

    #[test]
    fn test_writer_sink_rejects_drain_after_close() {
        let mut sink = WriterSink::new(Vec::new());
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(sink.is_closed());
        assert!(sink.drain(b"late", false).is_err());
    }
}
