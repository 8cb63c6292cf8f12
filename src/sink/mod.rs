//! Byte sinks drained by buffered output streams.
pub mod byte_sink;
pub mod writer_sink;

pub use byte_sink::ByteSink;
pub use writer_sink::WriterSink;
