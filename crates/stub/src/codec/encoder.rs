use crate::body::Compression;
use crate::codec::Writer;
use bytes::Bytes;
use flate2::write::{GzEncoder, ZlibEncoder};
use std::io;
use std::io::Write;
use tracing::trace;

/// Compresses a payload with one of the supported algorithms.
pub(crate) enum Encoder {
    /// Gzip encoding.
    Gzip(GzEncoder<Writer>),
    /// Deflate encoding.
    Deflate(ZlibEncoder<Writer>),
    /// Brotli encoding.
    Br(Box<brotli::CompressorWriter<Writer>>),
}

impl Encoder {
    fn gzip() -> Self {
        Self::Gzip(GzEncoder::new(Writer::new(), flate2::Compression::best()))
    }

    fn deflate() -> Self {
        Self::Deflate(ZlibEncoder::new(Writer::new(), flate2::Compression::best()))
    }

    fn br() -> Self {
        Self::Br(Box::new(brotli::CompressorWriter::new(
            Writer::new(),
            32 * 1024, // 32 KiB buffer
            3,         // BROTLI_PARAM_QUALITY
            22,        // BROTLI_PARAM_LGWIN
        )))
    }

    /// Selects an encoder for the compression, `None` for [`Compression::None`].
    pub(crate) fn select(compression: Compression) -> Option<Self> {
        match compression {
            Compression::None => None,
            Compression::Gzip => Some(Self::gzip()),
            Compression::Deflate => Some(Self::deflate()),
            Compression::Brotli => Some(Self::br()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Encoder::Gzip(_) => "gzip",
            Encoder::Deflate(_) => "deflate",
            Encoder::Br(_) => "br",
        }
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> Result<(), io::Error> {
        let result = match self {
            Self::Gzip(encoder) => encoder.write_all(data),
            Self::Deflate(encoder) => encoder.write_all(data),
            Self::Br(encoder) => encoder.write_all(data),
        };

        if let Err(err) = &result {
            trace!("Error encoding {} encoding: {}", self.name(), err);
        }
        result
    }

    /// Finishes the encoding process and returns the encoded data.
    pub(crate) fn finish(self) -> Result<Bytes, io::Error> {
        match self {
            Self::Gzip(encoder) => encoder.finish().map(|writer| writer.buf.freeze()),
            Self::Deflate(encoder) => encoder.finish().map(|writer| writer.buf.freeze()),
            // `into_inner` writes the final brotli block
            Self::Br(encoder) => Ok(encoder.into_inner().buf.freeze()),
        }
    }
}
