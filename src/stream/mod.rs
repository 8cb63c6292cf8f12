//! Buffered input and output streams and the byte buffer they share.
pub mod byte_buffer;
pub mod input_stream;
pub mod output_stream;
pub mod stream_config;
pub mod stream_error;

pub use byte_buffer::ByteBuffer;
pub use input_stream::BufferedInputStream;
pub use output_stream::BufferedOutputStream;
pub use stream_config::StreamConfig;
pub use stream_error::StreamError;
