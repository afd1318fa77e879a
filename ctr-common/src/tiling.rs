//! Tile address maps
//!
//! The launcher GPU samples textures in a tiled layout rather than row-major
//! order. The layout for each supported size ships as a permutation table:
//! entry `i` is the destination pixel offset of source pixel `i`.
//!
//! # Resource format
//! ```text
//! N entries × u16 LE, N = width × height
//! ```
//!
//! Tables are platform-mandated data. They are length- and range-checked on
//! load, but a table that is not a permutation is reported, never repaired.

use std::path::Path;

use crate::error::{CodecError, Result};
use crate::packing::{PixelFormat, Rgba8};

/// The three texture sizes the launcher uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// 24×24 small icon
    Icon24,
    /// 48×48 large icon
    Icon48,
    /// 256×128 banner
    Banner,
}

impl TextureDimension {
    pub const ALL: [TextureDimension; 3] = [Self::Icon24, Self::Icon48, Self::Banner];

    pub const fn width(self) -> u32 {
        match self {
            Self::Icon24 => 24,
            Self::Icon48 => 48,
            Self::Banner => 256,
        }
    }

    pub const fn height(self) -> u32 {
        match self {
            Self::Icon24 => 24,
            Self::Icon48 => 48,
            Self::Banner => 128,
        }
    }

    /// Number of pixels (and map entries).
    pub const fn pixel_count(self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Human-readable name used in error messages and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Icon24 => "icon24",
            Self::Icon48 => "icon48",
            Self::Banner => "banner",
        }
    }

    /// File name of the map resource inside a resource directory.
    pub const fn map_file_name(self) -> &'static str {
        match self {
            Self::Icon24 => "map24x24.bin",
            Self::Icon48 => "map48x48.bin",
            Self::Banner => "map256x128.bin",
        }
    }

    /// Icon dimension for a square side length.
    pub fn icon(size: u32) -> Option<Self> {
        match size {
            24 => Some(Self::Icon24),
            48 => Some(Self::Icon48),
            _ => None,
        }
    }
}

/// Linear source index → destination pixel offset permutation.
#[derive(Debug, Clone)]
pub struct TileAddressMap {
    dimension: TextureDimension,
    offsets: Vec<u16>,
}

impl TileAddressMap {
    /// Build a map from explicit offsets.
    ///
    /// Fails if the entry count does not match the dimension or an entry
    /// points past the end of the texture.
    pub fn from_offsets(dimension: TextureDimension, offsets: Vec<u16>) -> Result<Self> {
        let resource = dimension.map_file_name();
        let expected = dimension.pixel_count();
        if offsets.len() != expected {
            return Err(CodecError::resource(
                resource,
                format!("expected {} entries, found {}", expected, offsets.len()),
            ));
        }
        if let Some((index, &offset)) = offsets
            .iter()
            .enumerate()
            .find(|&(_, &offset)| offset as usize >= expected)
        {
            return Err(CodecError::resource(
                resource,
                format!("entry {} points to offset {} (limit {})", index, offset, expected),
            ));
        }

        let map = Self { dimension, offsets };
        if cfg!(debug_assertions) && !map.verify_bijection() {
            tracing::warn!("{} is not a permutation, some pixels will overlap", resource);
        }
        Ok(map)
    }

    /// Parse a map resource (`u16` little-endian entries).
    pub fn from_bytes(dimension: TextureDimension, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(CodecError::resource(
                dimension.map_file_name(),
                format!("odd length {} (truncated entry)", bytes.len()),
            ));
        }
        let offsets = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::from_offsets(dimension, offsets)
    }

    /// Load a map resource from a file.
    pub fn load_file(dimension: TextureDimension, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| CodecError::ResourceIo {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::from_bytes(dimension, &bytes)?;
        tracing::debug!(
            "Loaded {} tile map from {:?} ({} entries)",
            dimension.name(),
            path,
            map.len()
        );
        Ok(map)
    }

    /// Load the map for `dimension` from a resource directory.
    pub fn load(dimension: TextureDimension, resource_dir: &Path) -> Result<Self> {
        Self::load_file(dimension, &resource_dir.join(dimension.map_file_name()))
    }

    pub fn dimension(&self) -> TextureDimension {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offsets(&self) -> &[u16] {
        &self.offsets
    }

    /// Destination pixel offset for a source pixel index.
    #[inline]
    pub fn get(&self, index: usize) -> usize {
        self.offsets[index] as usize
    }

    /// Check that every destination offset appears exactly once.
    pub fn verify_bijection(&self) -> bool {
        let mut seen = vec![false; self.offsets.len()];
        for &offset in &self.offsets {
            let slot = &mut seen[offset as usize];
            if *slot {
                return false;
            }
            *slot = true;
        }
        true
    }

    /// Scatter row-major pixels into tiled order, packing each with `format`.
    ///
    /// Output is `2 × N` bytes; pixel `i` lands at byte `offsets[i] × 2`.
    pub fn tile(&self, pixels: &[Rgba8], format: PixelFormat) -> Vec<u8> {
        debug_assert_eq!(pixels.len(), self.offsets.len());
        let mut blob = vec![0u8; self.offsets.len() * PixelFormat::BYTES_PER_PIXEL];
        for (pixel, &dest) in pixels.iter().zip(&self.offsets) {
            let at = dest as usize * PixelFormat::BYTES_PER_PIXEL;
            blob[at..at + 2].copy_from_slice(&format.pack(*pixel));
        }
        blob
    }

    /// Gather a tiled blob back into row-major pixels.
    pub fn untile(&self, blob: &[u8], format: PixelFormat) -> Result<Vec<Rgba8>> {
        let expected = self.offsets.len() * PixelFormat::BYTES_PER_PIXEL;
        if blob.len() < expected {
            return Err(CodecError::Truncated {
                what: self.dimension.name(),
                expected,
                actual: blob.len(),
            });
        }
        Ok(self
            .offsets
            .iter()
            .map(|&dest| {
                let at = dest as usize * PixelFormat::BYTES_PER_PIXEL;
                format.unpack([blob[at], blob[at + 1]])
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 8×8 tiles in row-major tile order, Z-order inside each tile.
    pub(crate) fn swizzled(dimension: TextureDimension) -> TileAddressMap {
        let width = dimension.width() as usize;
        let tiles_per_row = width / 8;
        let offsets = (0..dimension.pixel_count())
            .map(|i| {
                let (x, y) = (i % width, i / width);
                let tile = (y / 8) * tiles_per_row + x / 8;
                let mut morton = 0;
                for bit in 0..3 {
                    morton |= ((x >> bit) & 1) << (2 * bit);
                    morton |= ((y >> bit) & 1) << (2 * bit + 1);
                }
                (tile * 64 + morton) as u16
            })
            .collect();
        TileAddressMap::from_offsets(dimension, offsets).unwrap()
    }

    fn to_bytes(offsets: &[u16]) -> Vec<u8> {
        offsets.iter().flat_map(|o| o.to_le_bytes()).collect()
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(TextureDimension::Icon24.pixel_count(), 576);
        assert_eq!(TextureDimension::Icon48.pixel_count(), 2304);
        assert_eq!(TextureDimension::Banner.pixel_count(), 32768);
        assert_eq!(TextureDimension::icon(48), Some(TextureDimension::Icon48));
        assert_eq!(TextureDimension::icon(32), None);
    }

    #[test]
    fn test_swizzled_maps_are_bijections() {
        for dimension in TextureDimension::ALL {
            let map = swizzled(dimension);
            assert_eq!(map.len(), dimension.pixel_count());
            assert!(map.verify_bijection(), "{}", dimension.name());
        }
    }

    #[test]
    fn test_from_bytes_little_endian() {
        let map = swizzled(TextureDimension::Icon24);
        let parsed =
            TileAddressMap::from_bytes(TextureDimension::Icon24, &to_bytes(map.offsets())).unwrap();
        assert_eq!(parsed.offsets(), map.offsets());
        // (1, 0) sits next to (0, 0) in the first tile
        assert_eq!(parsed.get(1), 1);
        // (0, 1) is the third entry of the Z-order
        assert_eq!(parsed.get(24), 2);
        // (8, 0) starts the second tile
        assert_eq!(parsed.get(8), 64);
    }

    #[test]
    fn test_wrong_entry_count_is_resource_error() {
        let map = swizzled(TextureDimension::Icon24);
        let bytes = to_bytes(map.offsets());
        let err = TileAddressMap::from_bytes(TextureDimension::Icon48, &bytes).unwrap_err();
        assert!(matches!(err, CodecError::Resource { .. }));
        assert!(err.to_string().contains("map48x48.bin"));
    }

    #[test]
    fn test_truncated_entry_is_resource_error() {
        let map = swizzled(TextureDimension::Icon24);
        let mut bytes = to_bytes(map.offsets());
        bytes.pop();
        let err = TileAddressMap::from_bytes(TextureDimension::Icon24, &bytes).unwrap_err();
        assert!(err.to_string().contains("odd length"));
    }

    #[test]
    fn test_out_of_range_entry_is_resource_error() {
        let mut offsets: Vec<u16> = (0..576).collect();
        offsets[10] = 576;
        let err = TileAddressMap::from_offsets(TextureDimension::Icon24, offsets).unwrap_err();
        assert!(err.to_string().contains("entry 10"));
    }

    #[test]
    fn test_missing_file_is_resource_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = TileAddressMap::load(TextureDimension::Banner, dir.path()).unwrap_err();
        assert!(matches!(err, CodecError::ResourceIo { .. }));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let map = swizzled(TextureDimension::Icon48);
        std::fs::write(dir.path().join("map48x48.bin"), to_bytes(map.offsets())).unwrap();
        let loaded = TileAddressMap::load(TextureDimension::Icon48, dir.path()).unwrap();
        assert_eq!(loaded.offsets(), map.offsets());
    }

    #[test]
    fn test_tile_untile() {
        let map = swizzled(TextureDimension::Icon24);
        let pixels: Vec<Rgba8> = (0..576)
            .map(|i| Rgba8::new((i % 32) as u8 * 8, (i % 64) as u8 * 4, (i / 64) as u8 * 8, 0xFF))
            .collect();
        let blob = map.tile(&pixels, PixelFormat::Rgb565);
        assert_eq!(blob.len(), 1152);
        assert_eq!(map.untile(&blob, PixelFormat::Rgb565).unwrap(), {
            pixels
                .iter()
                .map(|&p| PixelFormat::Rgb565.unpack(PixelFormat::Rgb565.pack(p)))
                .collect::<Vec<_>>()
        });
    }

    #[test]
    fn test_tile_places_pixel_at_mapped_offset() {
        let map = swizzled(TextureDimension::Icon24);
        let mut pixels = vec![Rgba8::BLACK; 576];
        pixels[8] = Rgba8::WHITE;
        let blob = map.tile(&pixels, PixelFormat::Rgb565);
        assert_eq!(&blob[128..130], &[0xFF, 0xFF]);
        assert_eq!(blob.iter().filter(|&&b| b != 0).count(), 2);
    }

    #[test]
    fn test_untile_short_blob() {
        let map = swizzled(TextureDimension::Icon24);
        assert!(map.untile(&[0u8; 10], PixelFormat::Rgb565).is_err());
    }
}
