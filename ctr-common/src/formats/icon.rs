//! Icon container (.icn)
//!
//! SMDH header followed by both tiled RGB565 icons. POD layout, no extra
//! framing: every section sits at a fixed offset.
//!
//! # Layout
//! ```text
//! 0x0000: SMDH header (0x2040 bytes)
//! 0x2040: 24×24 icon (0x480 bytes)
//! 0x24C0: 48×48 icon (0x1200 bytes)
//! ```

use crate::error::{CodecError, Result};
use crate::formats::smdh::MetadataHeader;
use crate::tiling::TextureDimension;

/// Size of the 24×24 icon blob.
pub const SMALL_ICON_SIZE: usize = TextureDimension::Icon24.pixel_count() * 2;
/// Size of the 48×48 icon blob.
pub const LARGE_ICON_SIZE: usize = TextureDimension::Icon48.pixel_count() * 2;

/// Offset of the 24×24 icon.
pub const SMALL_ICON_OFFSET: usize = MetadataHeader::SIZE;
/// Offset of the 48×48 icon.
pub const LARGE_ICON_OFFSET: usize = SMALL_ICON_OFFSET + SMALL_ICON_SIZE;

/// Total icon container size.
pub const ICON_FILE_SIZE: usize = LARGE_ICON_OFFSET + LARGE_ICON_SIZE;

/// Parsed icon container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconFile {
    pub header: MetadataHeader,
    pub small_icon: Vec<u8>,
    pub large_icon: Vec<u8>,
}

impl IconFile {
    /// Concatenate header and icons.
    pub fn assemble(header: &MetadataHeader, small_icon: &[u8], large_icon: &[u8]) -> Result<Vec<u8>> {
        check_len("24x24 icon", small_icon, SMALL_ICON_SIZE)?;
        check_len("48x48 icon", large_icon, LARGE_ICON_SIZE)?;

        let mut bytes = Vec::with_capacity(ICON_FILE_SIZE);
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(small_icon);
        bytes.extend_from_slice(large_icon);
        Ok(bytes)
    }

    /// Split an icon container by its fixed offsets.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ICON_FILE_SIZE {
            return Err(CodecError::Truncated {
                what: "icon container",
                expected: ICON_FILE_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            header: MetadataHeader::parse(bytes)?,
            small_icon: bytes[SMALL_ICON_OFFSET..LARGE_ICON_OFFSET].to_vec(),
            large_icon: bytes[LARGE_ICON_OFFSET..ICON_FILE_SIZE].to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Self::assemble(&self.header, &self.small_icon, &self.large_icon)
    }
}

fn check_len(what: &'static str, data: &[u8], expected: usize) -> Result<()> {
    if data.len() != expected {
        return Err(CodecError::Truncated {
            what,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::smdh::{AppTitle, SmdhFlags};

    fn header() -> MetadataHeader {
        MetadataHeader::build(&AppTitle::new("Long", "Short", "Pub"), SmdhFlags::default()).unwrap()
    }

    #[test]
    fn test_layout_constants() {
        assert_eq!(SMALL_ICON_SIZE, 0x480);
        assert_eq!(LARGE_ICON_SIZE, 0x1200);
        assert_eq!(LARGE_ICON_OFFSET, 0x24C0);
        assert_eq!(ICON_FILE_SIZE, 0x36C0);
    }

    #[test]
    fn test_assemble_then_parse_recovers_sections() {
        let header = header();
        let small: Vec<u8> = (0..SMALL_ICON_SIZE).map(|i| i as u8).collect();
        let large: Vec<u8> = (0..LARGE_ICON_SIZE).map(|i| (i * 7) as u8).collect();

        let bytes = IconFile::assemble(&header, &small, &large).unwrap();
        assert_eq!(bytes.len(), ICON_FILE_SIZE);

        let parsed = IconFile::parse(&bytes).unwrap();
        assert_eq!(parsed.header.as_bytes(), header.as_bytes());
        assert_eq!(parsed.small_icon, small);
        assert_eq!(parsed.large_icon, large);
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_assemble_rejects_wrong_icon_size() {
        let err = IconFile::assemble(&header(), &[0; 10], &[0; LARGE_ICON_SIZE]).unwrap_err();
        assert!(err.to_string().contains("24x24 icon"));
    }

    #[test]
    fn test_parse_truncated() {
        assert!(IconFile::parse(&[0u8; ICON_FILE_SIZE - 1]).is_err());
    }
}
