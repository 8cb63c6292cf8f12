//! Instrumented sources and sinks shared by the integration tests.
#![allow(dead_code)]

use bufstreams::{ByteSink, ByteSource};
use std::io;

// --- SOURCES ---

/// Serves `data` in chunks of at most `chunk` bytes and records every call.
pub struct ChunkedSource {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    pub fills: usize,
    pub closes: usize,
}

impl ChunkedSource {
    pub fn new(data: &[u8], chunk: usize) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            chunk,
            fills: 0,
            closes: 0,
        }
    }

    /// Makes more data available after the source already ran dry.
    pub fn append(&mut self, more: &[u8]) {
        self.data.extend_from_slice(more);
    }
}

impl ByteSource for ChunkedSource {
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fills += 1;
        let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes += 1;
        Ok(())
    }
}

/// Claims to have written one byte more than it was given room for.
pub struct OverrunSource;

impl ByteSource for OverrunSource {
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(buf.len() + 1)
    }
}

/// Fails every fill.
pub struct FailingSource;

impl ByteSource for FailingSource {
    fn fill(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"))
    }
}

// --- SINKS ---

/// Appends everything it accepts, after refusing the first `refusals` drains
/// of non-empty regions.
#[derive(Default)]
pub struct StallingSink {
    pub data: Vec<u8>,
    pub refusals: usize,
    pub drains: usize,
    pub finals: usize,
    pub closes: usize,
}

impl StallingSink {
    pub fn refusing(refusals: usize) -> Self {
        Self {
            refusals,
            ..Self::default()
        }
    }
}

impl ByteSink for StallingSink {
    fn drain(&mut self, buf: &[u8], is_final: bool) -> io::Result<usize> {
        self.drains += 1;
        if is_final {
            self.finals += 1;
        }
        if !buf.is_empty() && self.refusals > 0 {
            self.refusals -= 1;
            return Ok(0);
        }
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes += 1;
        Ok(())
    }
}

/// Only ever takes half of what it is offered.
pub struct HalfSink;

impl ByteSink for HalfSink {
    fn drain(&mut self, buf: &[u8], _is_final: bool) -> io::Result<usize> {
        Ok(buf.len() / 2)
    }
}

/// Fails every drain but records closes.
#[derive(Default)]
pub struct FailingSink {
    pub closes: usize,
}

impl ByteSink for FailingSink {
    fn drain(&mut self, _buf: &[u8], _is_final: bool) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "disk unplugged"))
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes += 1;
        Ok(())
    }
}

/// Deterministic pseudo-random test data.
pub fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 + i / 7) as u8).collect()
}
