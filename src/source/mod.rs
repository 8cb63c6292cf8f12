//! Byte sources feeding buffered input streams.
pub mod byte_source;
pub mod in_memory_source;
pub mod reader_source;

pub use byte_source::ByteSource;
pub use in_memory_source::InMemorySource;
pub use reader_source::ReaderSource;
