//! CBMD compressed banner container
//!
//! Wraps the compressed banner model (header template + tiled texture) with a
//! fixed 0x88-byte header. The payload is zero-padded to a 16-byte boundary.
//!
//! # Layout
//! ```text
//! 0x00: magic "CBMD"
//! 0x04: reserved (4 bytes)
//! 0x08: payload offset u32 LE (always 0x88)
//! 0x0C: reserved (0x78 bytes)
//! 0x84: total length u32 LE (header + padded payload)
//! 0x88: compressed payload + padding
//! ```

use crate::error::{CodecError, Result};

/// Magic bytes at the start of the container.
pub const CBMD_MAGIC: [u8; 4] = *b"CBMD";

/// Payload alignment.
pub const CBMD_ALIGNMENT: usize = 16;

const PAYLOAD_OFFSET_FIELD: usize = 0x08;
const LENGTH_FIELD: usize = 0x84;

/// Padding appended after a payload whose container would be `total_len` bytes.
///
/// Always between 1 and 16: an already aligned container still gets a full
/// 16 bytes of padding. Existing banners are laid out this way.
pub const fn padding_for(total_len: usize) -> usize {
    CBMD_ALIGNMENT - (total_len % CBMD_ALIGNMENT)
}

/// CBMD header (0x88 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CbmdHeader {
    /// Header plus padded payload, in bytes
    pub total_length: u32,
}

impl CbmdHeader {
    pub const SIZE: usize = 0x88;

    pub fn new(total_length: u32) -> Self {
        Self { total_length }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&CBMD_MAGIC);
        bytes[PAYLOAD_OFFSET_FIELD] = Self::SIZE as u8;
        let mut length = self.total_length;
        for byte in &mut bytes[LENGTH_FIELD..LENGTH_FIELD + 4] {
            *byte = (length & 0xFF) as u8;
            length >>= 8;
        }
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE || bytes[0..4] != CBMD_MAGIC {
            return None;
        }
        Some(Self {
            total_length: u32::from_le_bytes([
                bytes[LENGTH_FIELD],
                bytes[LENGTH_FIELD + 1],
                bytes[LENGTH_FIELD + 2],
                bytes[LENGTH_FIELD + 3],
            ]),
        })
    }

    /// Padded payload length.
    pub fn payload_len(&self) -> usize {
        (self.total_length as usize).saturating_sub(Self::SIZE)
    }
}

/// Complete CBMD container: header followed by the padded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbmdContainer {
    bytes: Vec<u8>,
}

impl CbmdContainer {
    /// Wrap already-compressed banner data.
    pub fn wrap(compressed: &[u8]) -> Result<Self> {
        let unpadded = compressed.len() + CbmdHeader::SIZE;
        let pad = padding_for(unpadded);
        let total = unpadded + pad;
        let total_length = u32::try_from(total).map_err(|_| CodecError::ContainerOverflow(total))?;

        let mut bytes = Vec::with_capacity(total);
        bytes.extend_from_slice(&CbmdHeader::new(total_length).to_bytes());
        bytes.extend_from_slice(compressed);
        bytes.resize(total, 0);

        tracing::debug!(
            "CBMD: {} compressed bytes + {} padding = {} total",
            compressed.len(),
            pad,
            total
        );
        Ok(Self { bytes })
    }

    /// Split a container off the front of `bytes`, returning it and the rest.
    pub fn parse(bytes: &[u8]) -> Result<(Self, &[u8])> {
        if bytes.len() < CbmdHeader::SIZE {
            return Err(CodecError::Truncated {
                what: "CBMD header",
                expected: CbmdHeader::SIZE,
                actual: bytes.len(),
            });
        }
        let header = CbmdHeader::from_bytes(bytes)
            .ok_or_else(|| CodecError::resource("CBMD header", "bad magic"))?;
        let total = header.total_length as usize;
        if total < CbmdHeader::SIZE || bytes.len() < total {
            return Err(CodecError::Truncated {
                what: "CBMD container",
                expected: total,
                actual: bytes.len(),
            });
        }
        let (container, rest) = bytes.split_at(total);
        Ok((
            Self {
                bytes: container.to_vec(),
            },
            rest,
        ))
    }

    pub fn header(&self) -> CbmdHeader {
        CbmdHeader::new(self.bytes.len() as u32)
    }

    /// Compressed payload including its trailing padding.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[CbmdHeader::SIZE..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_prefix() {
        let bytes = CbmdHeader::new(0x1234).to_bytes();
        assert_eq!(&bytes[0..9], b"CBMD\0\0\0\0\x88");
        assert!(bytes[9..0x84].iter().all(|&b| b == 0));
        assert_eq!(0x84 - 9, 0x7B);
        assert_eq!(&bytes[0x84..0x88], &[0x34, 0x12, 0x00, 0x00]);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = CbmdHeader::new(0xDEADBEEF);
        assert_eq!(CbmdHeader::from_bytes(&header.to_bytes()), Some(header));
        assert_eq!(CbmdHeader::from_bytes(&[0u8; 0x88]), None);
        assert_eq!(CbmdHeader::from_bytes(b"CBMD"), None);
    }

    #[test]
    fn test_padding_never_zero() {
        assert_eq!(padding_for(136), 8);
        assert_eq!(padding_for(143), 1);
        assert_eq!(padding_for(144), 16);
        assert_eq!(padding_for(160), 16);
    }

    #[test]
    fn test_wrap_aligned_payload_gets_sixteen_bytes() {
        // 136 + 8 = 144, already a multiple of 16
        let container = CbmdContainer::wrap(&[0xAA; 8]).unwrap();
        assert_eq!(container.as_bytes().len(), 160);
        assert_eq!(container.header().total_length, 160);
        assert_eq!(&container.payload()[..8], &[0xAA; 8]);
        assert!(container.payload()[8..].iter().all(|&b| b == 0));
        assert_eq!(container.payload().len(), 24);
    }

    #[test]
    fn test_wrap_writes_length_field() {
        let container = CbmdContainer::wrap(&[1, 2, 3]).unwrap();
        // 136 + 3 = 139 -> pad 5 -> 144
        assert_eq!(container.as_bytes().len(), 144);
        let header = CbmdHeader::from_bytes(container.as_bytes()).unwrap();
        assert_eq!(header.total_length, 144);
        assert_eq!(header.payload_len(), 8);
        assert_eq!(container.as_bytes().len() % CBMD_ALIGNMENT, 0);
    }

    #[test]
    fn test_parse_splits_trailing_audio() {
        let container = CbmdContainer::wrap(&[7; 20]).unwrap();
        let mut file = container.as_bytes().to_vec();
        file.extend_from_slice(b"CWAV");

        let (parsed, rest) = CbmdContainer::parse(&file).unwrap();
        assert_eq!(parsed, container);
        assert_eq!(rest, b"CWAV");
    }

    #[test]
    fn test_parse_truncated() {
        let container = CbmdContainer::wrap(&[7; 20]).unwrap();
        let bytes = container.as_bytes();
        assert!(CbmdContainer::parse(&bytes[..bytes.len() - 1]).is_err());
        assert!(matches!(
            CbmdContainer::parse(&bytes[..10]),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn test_parse_bad_magic() {
        let mut bytes = CbmdContainer::wrap(&[7; 20]).unwrap().as_bytes().to_vec();
        bytes[..4].copy_from_slice(b"SMDH");
        let err = CbmdContainer::parse(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::Resource { .. }));
        assert!(err.to_string().contains("bad magic"));
    }
}
