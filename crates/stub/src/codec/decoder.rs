use crate::body::Compression;
use crate::error::DecompressError;
use crate::resolve::Decompress;
use bytes::Bytes;
use flate2::read::{GzDecoder, ZlibDecoder};
use std::io::Read;
use tracing::trace;

const BROTLI_BUFFER_SIZE: usize = 4096;

/// Default cap on the decompressed size of a single payload, 64 MiB.
pub const DEFAULT_OUTPUT_LIMIT: u64 = 64 * 1024 * 1024;

/// Streaming decompressor backed by `flate2` and `brotli`.
///
/// Output beyond the limit fails the payload instead of growing without bound.
#[derive(Debug, Copy, Clone)]
pub struct Decoder {
    limit: u64,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::with_limit(DEFAULT_OUTPUT_LIMIT)
    }
}

impl Decoder {
    pub fn with_limit(limit: u64) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    fn read_capped(&self, reader: impl Read, out: &mut Vec<u8>) -> std::io::Result<usize> {
        // one byte past the limit tells an exact fit from an overflow
        reader.take(self.limit.saturating_add(1)).read_to_end(out)
    }
}

impl Decompress for Decoder {
    fn decompress(&self, bytes: &[u8], algorithm: Compression) -> Result<Bytes, DecompressError> {
        let mut out = Vec::with_capacity(bytes.len() * 2);
        let result = match algorithm {
            Compression::None => return Ok(Bytes::copy_from_slice(bytes)),
            Compression::Gzip => self.read_capped(GzDecoder::new(bytes), &mut out),
            Compression::Deflate => self.read_capped(ZlibDecoder::new(bytes), &mut out),
            Compression::Brotli => self.read_capped(brotli::Decompressor::new(bytes, BROTLI_BUFFER_SIZE), &mut out),
        };

        match result {
            Ok(size) if size as u64 > self.limit => Err(DecompressError::too_large(algorithm, self.limit)),
            Ok(size) => {
                trace!(algorithm = %algorithm, compressed = bytes.len(), size, "decompressed payload");
                Ok(Bytes::from(out))
            }
            Err(e) => Err(DecompressError::malformed(algorithm, e)),
        }
    }
}
