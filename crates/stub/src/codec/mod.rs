//! Compression codecs for stored body payloads.
//!
//! - `decoder`: [`Decoder`], the default [`crate::resolve::Decompress`] implementation used
//!   when resolving enriched bodies
//! - `encoder`: the inverse, used to author compressed inline payloads
//!
//! Both support gzip, deflate (zlib wrapped, as HTTP `deflate` is) and brotli.

use bytes::BytesMut;
use std::io;

mod decoder;
mod encoder;

pub use decoder::DEFAULT_OUTPUT_LIMIT;
pub use decoder::Decoder;
pub(crate) use encoder::Encoder;

// inspired by from actix-http
pub(crate) struct Writer {
    buf: BytesMut,
}

impl Writer {
    fn new() -> Self {
        Self { buf: BytesMut::with_capacity(4096) }
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
