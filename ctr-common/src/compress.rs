//! Compression seam for the banner model.
//!
//! The launcher decompresses banners with an LZ11-family decoder. The encoder
//! lives outside this crate (usually an external tool); anything implementing
//! [`Compressor`] can be plugged into [`crate::encode::encode_banner`].

use crate::error::Result;

/// Byte-in, byte-out compressor.
pub trait Compressor: Send + Sync {
    /// Name shown in logs and errors.
    fn name(&self) -> &str;

    /// Compress `data`.
    ///
    /// Failures should be reported as [`crate::CodecError::Compression`].
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

impl<C: Compressor + ?Sized> Compressor for &C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).compress(data)
    }
}

impl<C: Compressor + ?Sized> Compressor for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).compress(data)
    }
}
