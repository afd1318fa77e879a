//! SMDH application metadata header
//!
//! Fixed-size block at the start of an icon container. Holds per-language
//! titles, launcher flags and a settings trailer. Titles are UTF-16LE and
//! zero-padded to their field width.
//!
//! # Layout
//! ```text
//! 0x0000: magic "SMDH" + 4 reserved bytes
//! 0x0008: 11 language slots × 0x200 bytes
//!         +0x000 long title   (0x40 UTF-16 units)
//!         +0x080 short title  (0x80 UTF-16 units)
//!         +0x180 publisher    (0x40 UTF-16 units)
//! 0x1608: reserved (zero)
//! 0x2000: settings trailer (0x40 bytes, see SETTINGS_TRAILER)
//! 0x2028: flags low byte
//! 0x2029: flags high byte
//! ```

use crate::error::{CodecError, Result};

/// Magic bytes at the start of the header.
pub const SMDH_MAGIC: [u8; 4] = *b"SMDH";

/// Total header size.
pub const SMDH_HEADER_SIZE: usize = 0x2040;

/// Number of language slots written.
pub const LANGUAGE_SLOT_COUNT: usize = 11;

/// Offset of the first language slot.
pub const TITLES_OFFSET: usize = 0x8;

/// Size of one language slot.
pub const LANGUAGE_SLOT_SIZE: usize = 0x200;

/// Capacity of the long title field in UTF-16 code units.
pub const LONG_TITLE_UNITS: usize = 0x40;
/// Capacity of the short title field in UTF-16 code units.
pub const SHORT_TITLE_UNITS: usize = 0x80;
/// Capacity of the publisher field in UTF-16 code units.
pub const PUBLISHER_UNITS: usize = 0x40;

/// Offset of the settings trailer.
pub const SETTINGS_OFFSET: usize = 0x2000;

/// Offset of the two flag bytes.
pub const FLAGS_OFFSET: usize = 0x2028;

/// Default settings block: age ratings, region lockout (`0x7FFFFFFF`, all
/// regions), matchmaker ids, flags, EULA version 1.0, default animation frame
/// (`1.0f32`) and streetpass id.
pub const SETTINGS_TRAILER: [u8; 0x40] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, //
    0x20, 0x20, 0x20, 0x20, 0x00, 0x00, 0x00, 0x00, //
    0xFF, 0xFF, 0xFF, 0x7F, 0x31, 0x48, 0x62, 0x64, //
    0x99, 0x99, 0x99, 0x19, 0x91, 0x18, 0x62, 0x64, //
    0xA5, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, //
    0x00, 0x00, 0x80, 0x3F, 0x32, 0x41, 0x79, 0x24, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
];

/// Launcher flags, packed LSB-first into two bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmdhFlags {
    pub visible: bool,
    pub auto_boot: bool,
    pub use_3d: bool,
    pub require_eula: bool,
    pub auto_save_on_exit: bool,
    pub extended_banner: bool,
    pub game_ratings: bool,
    pub use_save_data: bool,
    pub record_app_usage: bool,
    pub disable_save_backup: bool,
}

impl Default for SmdhFlags {
    fn default() -> Self {
        Self {
            visible: true,
            auto_boot: false,
            use_3d: true,
            require_eula: false,
            auto_save_on_exit: false,
            extended_banner: false,
            game_ratings: false,
            use_save_data: true,
            record_app_usage: false,
            disable_save_backup: false,
        }
    }
}

impl SmdhFlags {
    pub fn to_bytes(&self) -> [u8; 2] {
        let low = self.visible as u8
            | (self.auto_boot as u8) << 1
            | (self.use_3d as u8) << 2
            | (self.require_eula as u8) << 3
            | (self.auto_save_on_exit as u8) << 4
            | (self.extended_banner as u8) << 5
            | (self.game_ratings as u8) << 6
            | (self.use_save_data as u8) << 7;
        let high = self.record_app_usage as u8 | (self.disable_save_backup as u8) << 2;
        [low, high]
    }

    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        let bit = |byte: u8, n: u8| byte & (1 << n) != 0;
        Self {
            visible: bit(bytes[0], 0),
            auto_boot: bit(bytes[0], 1),
            use_3d: bit(bytes[0], 2),
            require_eula: bit(bytes[0], 3),
            auto_save_on_exit: bit(bytes[0], 4),
            extended_banner: bit(bytes[0], 5),
            game_ratings: bit(bytes[0], 6),
            use_save_data: bit(bytes[0], 7),
            record_app_usage: bit(bytes[1], 0),
            disable_save_backup: bit(bytes[1], 2),
        }
    }
}

/// The three strings repeated in every language slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppTitle {
    pub long_title: String,
    pub short_title: String,
    pub publisher: String,
}

impl AppTitle {
    pub fn new(
        long_title: impl Into<String>,
        short_title: impl Into<String>,
        publisher: impl Into<String>,
    ) -> Self {
        Self {
            long_title: long_title.into(),
            short_title: short_title.into(),
            publisher: publisher.into(),
        }
    }

    /// Check every string against its field capacity.
    pub fn validate(&self) -> Result<()> {
        self.encoded().map(|_| ())
    }

    fn encoded(&self) -> Result<[Vec<u16>; 3]> {
        Ok([
            encode_field("long title", &self.long_title, LONG_TITLE_UNITS)?,
            encode_field("short title", &self.short_title, SHORT_TITLE_UNITS)?,
            encode_field("publisher", &self.publisher, PUBLISHER_UNITS)?,
        ])
    }
}

fn encode_field(field: &'static str, text: &str, capacity: usize) -> Result<Vec<u16>> {
    let units: Vec<u16> = text.encode_utf16().collect();
    if units.len() > capacity {
        return Err(CodecError::FieldOverflow {
            field,
            units: units.len(),
            capacity,
        });
    }
    Ok(units)
}

fn write_units(buf: &mut [u8], units: &[u16]) {
    for (slot, unit) in buf.chunks_exact_mut(2).zip(units) {
        slot.copy_from_slice(&unit.to_le_bytes());
    }
}

fn read_units(buf: &[u8]) -> String {
    let units: Vec<u16> = buf
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Byte ranges of the three fields inside language slot `slot`.
fn slot_fields(slot: usize) -> [std::ops::Range<usize>; 3] {
    let base = TITLES_OFFSET + slot * LANGUAGE_SLOT_SIZE;
    let short = base + LONG_TITLE_UNITS * 2;
    let publisher = short + SHORT_TITLE_UNITS * 2;
    [
        base..short,
        short..publisher,
        publisher..publisher + PUBLISHER_UNITS * 2,
    ]
}

/// Built SMDH header, always exactly [`SMDH_HEADER_SIZE`] bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct MetadataHeader {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for MetadataHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataHeader")
            .field("title", &self.title(0))
            .field("flags", &self.flags())
            .finish()
    }
}

impl MetadataHeader {
    pub const SIZE: usize = SMDH_HEADER_SIZE;

    /// Build the header. All strings are checked before anything is written.
    pub fn build(title: &AppTitle, flags: SmdhFlags) -> Result<Self> {
        let fields = title.encoded()?;

        let mut bytes = vec![0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&SMDH_MAGIC);
        bytes[SETTINGS_OFFSET..].copy_from_slice(&SETTINGS_TRAILER);
        bytes[FLAGS_OFFSET..FLAGS_OFFSET + 2].copy_from_slice(&flags.to_bytes());

        for slot in 0..LANGUAGE_SLOT_COUNT {
            for (range, units) in slot_fields(slot).into_iter().zip(&fields) {
                write_units(&mut bytes[range], units);
            }
        }

        Ok(Self { bytes })
    }

    /// Parse a header from the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(CodecError::Truncated {
                what: "SMDH header",
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[0..4] != SMDH_MAGIC {
            return Err(CodecError::resource("SMDH header", "bad magic"));
        }
        Ok(Self {
            bytes: bytes[..Self::SIZE].to_vec(),
        })
    }

    pub fn flags(&self) -> SmdhFlags {
        SmdhFlags::from_bytes([self.bytes[FLAGS_OFFSET], self.bytes[FLAGS_OFFSET + 1]])
    }

    /// Decode the strings of one language slot.
    pub fn title(&self, slot: usize) -> Option<AppTitle> {
        if slot >= LANGUAGE_SLOT_COUNT {
            return None;
        }
        let [long, short, publisher] = slot_fields(slot);
        Some(AppTitle {
            long_title: read_units(&self.bytes[long]),
            short_title: read_units(&self.bytes[short]),
            publisher: read_units(&self.bytes[publisher]),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> MetadataHeader {
        MetadataHeader::build(&AppTitle::new("A", "B", "C"), SmdhFlags::default()).unwrap()
    }

    #[test]
    fn test_header_size() {
        assert_eq!(abc().as_bytes().len(), 0x2040);
        assert_eq!(
            TITLES_OFFSET + LANGUAGE_SLOT_COUNT * LANGUAGE_SLOT_SIZE,
            0x1608
        );
    }

    #[test]
    fn test_magic_and_trailer() {
        let header = abc();
        let bytes = header.as_bytes();
        assert_eq!(&bytes[0..8], b"SMDH\0\0\0\0");
        assert_eq!(&bytes[0x2018..0x201C], &[0xFF, 0xFF, 0xFF, 0x7F]);
        assert_eq!(&bytes[0x2030..0x2034], &1.0f32.to_le_bytes());
        assert!(bytes[0x1608..0x2000].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_identical_slots_at_documented_offsets() {
        let header = abc();
        let bytes = header.as_bytes();
        for slot in 0..LANGUAGE_SLOT_COUNT {
            let base = 8 + slot * 0x200;
            assert_eq!(&bytes[base..base + 2], &[b'A', 0], "slot {slot}");
            assert_eq!(&bytes[base + 0x80..base + 0x82], &[b'B', 0], "slot {slot}");
            assert_eq!(&bytes[base + 0x180..base + 0x182], &[b'C', 0], "slot {slot}");
            assert_eq!(
                &bytes[base..base + 0x200],
                &bytes[8..8 + 0x200],
                "slot {slot} differs from slot 0"
            );
            assert_eq!(header.title(slot).unwrap(), AppTitle::new("A", "B", "C"));
        }
        assert!(header.title(LANGUAGE_SLOT_COUNT).is_none());
    }

    #[test]
    fn test_default_flags_match_legacy_bytes() {
        let header = abc();
        // visible | use_3d | use_save_data
        assert_eq!(header.as_bytes()[0x2028], 0x85);
        assert_eq!(header.as_bytes()[0x2029], 0x00);
        assert_eq!(header.flags(), SmdhFlags::default());
    }

    #[test]
    fn test_flag_bits() {
        let flags = SmdhFlags {
            visible: false,
            auto_boot: true,
            use_3d: false,
            require_eula: true,
            auto_save_on_exit: false,
            extended_banner: true,
            game_ratings: false,
            use_save_data: false,
            record_app_usage: true,
            disable_save_backup: true,
        };
        assert_eq!(flags.to_bytes(), [0b0010_1010, 0b0000_0101]);
        assert_eq!(SmdhFlags::from_bytes(flags.to_bytes()), flags);
    }

    #[test]
    fn test_non_ascii_title_is_utf16le() {
        let title = AppTitle::new("Ωmega", "é", "");
        let header = MetadataHeader::build(&title, SmdhFlags::default()).unwrap();
        assert_eq!(&header.as_bytes()[8..10], &0x03A9u16.to_le_bytes());
        assert_eq!(header.title(3).unwrap(), title);
    }

    #[test]
    fn test_field_at_capacity_fits() {
        let long = "L".repeat(LONG_TITLE_UNITS);
        let short = "S".repeat(SHORT_TITLE_UNITS);
        let publisher = "P".repeat(PUBLISHER_UNITS);
        let title = AppTitle::new(long, short, publisher);
        let header = MetadataHeader::build(&title, SmdhFlags::default()).unwrap();
        assert_eq!(header.title(10).unwrap(), title);
    }

    #[test]
    fn test_long_title_overflow() {
        let title = AppTitle::new("x".repeat(65), "B", "C");
        let err = MetadataHeader::build(&title, SmdhFlags::default()).unwrap_err();
        match err {
            CodecError::FieldOverflow {
                field,
                units,
                capacity,
            } => {
                assert_eq!(field, "long title");
                assert_eq!(units, 65);
                assert_eq!(capacity, 64);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overflow_counts_code_units_not_chars() {
        // 33 astral characters = 66 UTF-16 code units
        let title = AppTitle::new("🎮".repeat(33), "", "");
        assert!(matches!(
            title.validate(),
            Err(CodecError::FieldOverflow { units: 66, .. })
        ));
    }

    #[test]
    fn test_publisher_overflow() {
        let title = AppTitle::new("A", "B", "p".repeat(PUBLISHER_UNITS + 1));
        assert!(matches!(
            title.validate(),
            Err(CodecError::FieldOverflow {
                field: "publisher",
                ..
            })
        ));
    }

    #[test]
    fn test_parse() {
        let header = abc();
        let parsed = MetadataHeader::parse(header.as_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert!(MetadataHeader::parse(&header.as_bytes()[..100]).is_err());

        let mut bad = header.into_bytes();
        bad[0] = b'X';
        assert!(MetadataHeader::parse(&bad).is_err());
    }
}
