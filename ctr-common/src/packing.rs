//! Pixel quantization utilities
//!
//! Converts 8-bit-per-channel RGBA pixels into the 16-bit packed formats the
//! launcher samples from:
//! - RGB565 (icons, alpha discarded)
//! - RGBA4444 (banner)
//!
//! Quantization is a truncating right shift with no rounding. Launcher assets
//! produced by other tools rely on this exact behavior, so it must not change.

use bytemuck::{Pod, Zeroable};

/// One 8-bit-per-channel RGBA pixel, laid out as in an `image::RgbaImage` buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::new(0, 0, 0, 0xFF);
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Reinterpret a raw RGBA8 byte buffer as pixels.
    ///
    /// Returns `None` if the buffer length is not a multiple of 4.
    pub fn cast_slice(raw: &[u8]) -> Option<&[Rgba8]> {
        bytemuck::try_cast_slice(raw).ok()
    }
}

/// Packed 16-bit destination pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 5-6-5 RGB, used for both icon sizes.
    Rgb565,
    /// 4-4-4-4 RGBA, used for the banner.
    Rgba4444,
}

impl PixelFormat {
    /// Every supported format packs into two bytes.
    pub const BYTES_PER_PIXEL: usize = 2;

    /// Channel bit widths in (r, g, b, a) order.
    pub const fn channel_bits(self) -> [u8; 4] {
        match self {
            PixelFormat::Rgb565 => [5, 6, 5, 0],
            PixelFormat::Rgba4444 => [4, 4, 4, 4],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::Rgb565 => "RGB565",
            PixelFormat::Rgba4444 => "RGBA4444",
        }
    }

    /// Quantize one pixel into its two destination bytes.
    #[inline]
    pub fn pack(self, pixel: Rgba8) -> [u8; 2] {
        match self {
            PixelFormat::Rgb565 => pack_rgb565(pixel),
            PixelFormat::Rgba4444 => pack_rgba4444(pixel),
        }
    }

    /// Expand two destination bytes back to RGBA8.
    ///
    /// Low bits are filled by bit replication, so a saturated channel expands
    /// back to 0xFF. RGB565 has no alpha and decodes as opaque.
    #[inline]
    pub fn unpack(self, bytes: [u8; 2]) -> Rgba8 {
        match self {
            PixelFormat::Rgb565 => unpack_rgb565(bytes),
            PixelFormat::Rgba4444 => unpack_rgba4444(bytes),
        }
    }
}

/// Quantize a pixel into `format`.
#[inline]
pub fn quantize(pixel: Rgba8, format: PixelFormat) -> [u8; 2] {
    format.pack(pixel)
}

// ============================================================================
// RGB565
// ============================================================================

/// Pack to RGB565: byte 0 holds the low green bits and blue, byte 1 holds red
/// and the high green bits.
#[inline]
pub fn pack_rgb565(pixel: Rgba8) -> [u8; 2] {
    let r = pixel.r >> 3;
    let g = pixel.g >> 2;
    let b = pixel.b >> 3;
    [((g & 7) << 5) | b, (r << 3) | (g >> 3)]
}

#[inline]
pub fn unpack_rgb565(bytes: [u8; 2]) -> Rgba8 {
    let value = u16::from_le_bytes(bytes);
    let r = ((value >> 11) & 0x1F) as u8;
    let g = ((value >> 5) & 0x3F) as u8;
    let b = (value & 0x1F) as u8;
    Rgba8::new(
        (r << 3) | (r >> 2),
        (g << 2) | (g >> 4),
        (b << 3) | (b >> 2),
        0xFF,
    )
}

// ============================================================================
// RGBA4444
// ============================================================================

/// Pack to RGBA4444: byte 0 is blue/alpha, byte 1 is red/green.
#[inline]
pub fn pack_rgba4444(pixel: Rgba8) -> [u8; 2] {
    let r = pixel.r >> 4;
    let g = pixel.g >> 4;
    let b = pixel.b >> 4;
    let a = pixel.a >> 4;
    [(b << 4) | a, (r << 4) | g]
}

#[inline]
pub fn unpack_rgba4444(bytes: [u8; 2]) -> Rgba8 {
    let expand = |nibble: u8| (nibble << 4) | nibble;
    Rgba8::new(
        expand(bytes[1] >> 4),
        expand(bytes[1] & 0x0F),
        expand(bytes[0] >> 4),
        expand(bytes[0] & 0x0F),
    )
}
