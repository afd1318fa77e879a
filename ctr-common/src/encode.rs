//! Icon and banner texture encoders
//!
//! Both encoders quantize every source pixel and scatter it into the tiled
//! layout given by a [`TileAddressMap`]. The banner additionally prepends the
//! model header template, compresses the result and wraps it in CBMD.

use crate::compress::Compressor;
use crate::error::{CodecError, Result};
use crate::formats::cbmd::CbmdContainer;
use crate::packing::{PixelFormat, Rgba8};
use crate::tiling::{TextureDimension, TileAddressMap};

/// Fully decoded RGBA8 image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl SourceImage {
    /// Wrap row-major pixels. Returns `None` if the count is not `width × height`.
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap a raw RGBA8 byte buffer.
    pub fn from_raw(width: u32, height: u32, raw: &[u8]) -> Option<Self> {
        Self::new(width, height, Rgba8::cast_slice(raw)?.to_vec())
    }

    /// Image with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: Rgba8) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    fn check(&self, dimension: TextureDimension) -> Result<()> {
        if self.width != dimension.width() || self.height != dimension.height() {
            return Err(CodecError::dimension(dimension, self.width, self.height));
        }
        Ok(())
    }
}

/// Tiled, quantized texture data: two bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTexture {
    pub dimension: TextureDimension,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl EncodedTexture {
    /// Encode `image` with `map`, checking its size first.
    pub fn encode(image: &SourceImage, map: &TileAddressMap, format: PixelFormat) -> Result<Self> {
        let dimension = map.dimension();
        image.check(dimension)?;
        let data = map.tile(image.pixels(), format);
        tracing::debug!(
            "Encoded {} ({}x{}, {}): {} bytes",
            dimension.name(),
            dimension.width(),
            dimension.height(),
            format.name(),
            data.len()
        );
        Ok(Self {
            dimension,
            format,
            data,
        })
    }

    /// Decode back to a row-major image.
    pub fn decode(&self, map: &TileAddressMap) -> Result<SourceImage> {
        let pixels = map.untile(&self.data, self.format)?;
        Ok(SourceImage {
            width: self.dimension.width(),
            height: self.dimension.height(),
            pixels,
        })
    }
}

/// Encode a square RGB565 icon. `map` selects the size (24 or 48).
pub fn encode_icon(image: &SourceImage, map: &TileAddressMap) -> Result<EncodedTexture> {
    if map.dimension() == TextureDimension::Banner {
        return Err(CodecError::resource(
            map.dimension().map_file_name(),
            "banner map used for an icon",
        ));
    }
    EncodedTexture::encode(image, map, PixelFormat::Rgb565)
}

/// Encode the 256×128 banner texture as RGBA4444 (uncompressed).
pub fn encode_banner_texture(image: &SourceImage, map: &TileAddressMap) -> Result<EncodedTexture> {
    if map.dimension() != TextureDimension::Banner {
        return Err(CodecError::resource(
            map.dimension().map_file_name(),
            "icon map used for the banner",
        ));
    }
    EncodedTexture::encode(image, map, PixelFormat::Rgba4444)
}

/// Build the banner CBMD: `header_template ∥ texture`, compressed and framed.
pub fn encode_banner<C: Compressor + ?Sized>(
    image: &SourceImage,
    map: &TileAddressMap,
    header_template: &[u8],
    compressor: &C,
) -> Result<CbmdContainer> {
    let texture = encode_banner_texture(image, map)?;
    wrap_banner_texture(&texture, header_template, compressor)
}

/// Compress and frame an already encoded banner texture.
pub fn wrap_banner_texture<C: Compressor + ?Sized>(
    texture: &EncodedTexture,
    header_template: &[u8],
    compressor: &C,
) -> Result<CbmdContainer> {
    if header_template.is_empty() {
        return Err(CodecError::resource("header.bin", "header template is empty"));
    }

    let mut model = Vec::with_capacity(header_template.len() + texture.data.len());
    model.extend_from_slice(header_template);
    model.extend_from_slice(&texture.data);

    let compressed = compressor.compress(&model)?;
    tracing::debug!(
        "Compressed banner model with {}: {} -> {} bytes",
        compressor.name(),
        model.len(),
        compressed.len()
    );
    CbmdContainer::wrap(&compressed)
}
