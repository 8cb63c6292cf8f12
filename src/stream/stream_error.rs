//! Errors raised by buffered streams.

use std::io;
use thiserror::Error;

// =#========================================================================#=
// STREAM ERROR
// =#========================================================================#=
/// Error types that can occur while operating a buffered stream.
///
/// End of stream is not an error: reads report it through `None` or short
/// counts. The variants fall into three groups:
/// - misuse of the stream API ([NotAnchored](StreamError::NotAnchored),
///   [Closed](StreamError::Closed) and the configuration variants),
/// - contract violations by a source or sink
///   ([SourceOverrun](StreamError::SourceOverrun),
///   [PartialDrain](StreamError::PartialDrain)),
/// - I/O failures reported by the source or sink ([Io](StreamError::Io)).
#[derive(Debug, Error)]
pub enum StreamError {
    /// `upanchor` or `take_anchored` without an active anchor.
    #[error("stream is not anchored")]
    NotAnchored,

    /// Buffer capacity must be positive.
    #[error("invalid buffer capacity {0}, must be at least 1")]
    InvalidCapacity(usize),

    /// Growth factor must actually grow the buffer.
    #[error("invalid growth factor {0}, must be at least 2")]
    InvalidGrowthFactor(usize),

    /// Configured maximum is smaller than the initial capacity.
    #[error("maximum capacity {max} is below initial capacity {capacity}")]
    InvalidMaxCapacity { capacity: usize, max: usize },

    /// Keeping the requested data would grow the buffer past its configured maximum.
    #[error("buffer would need {required} bytes, maximum capacity is {max}")]
    CapacityExceeded { required: usize, max: usize },

    /// A source claimed to have written more bytes than the region it was given.
    #[error("source reported {returned} bytes written into a region of {requested} bytes")]
    SourceOverrun { returned: usize, requested: usize },

    /// A sink consumed something other than nothing or everything.
    #[error("sink consumed {consumed} of {offered} bytes, expected 0 or {offered}")]
    PartialDrain { consumed: usize, offered: usize },

    /// Flush gave up after the configured number of zero-consumption drains.
    #[error("sink accepted nothing in {attempts} consecutive drain attempts")]
    FlushStalled { attempts: usize },

    /// Operation on a stream that has already been closed.
    #[error("stream is closed")]
    Closed,

    /// I/O failure of the underlying source or sink.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StreamError {
    /// Returns `true` for contract violations by a source or sink.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            StreamError::SourceOverrun { .. } | StreamError::PartialDrain { .. }
        )
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(e) => e,
            StreamError::Closed => io::Error::new(io::ErrorKind::BrokenPipe, err),
            StreamError::FlushStalled { .. } => io::Error::new(io::ErrorKind::WriteZero, err),
            StreamError::SourceOverrun { .. } | StreamError::PartialDrain { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
            other => io::Error::other(other),
        }
    }
}
