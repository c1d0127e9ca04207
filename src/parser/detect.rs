use crate::parser::cursor::Tag;
use serde::{Deserialize, Serialize};

pub const NATIVE_MAGIC: &[u8; 15] = b"Hantei6DataFile";
pub const NATIVE_HEADER_SIZE: usize = 0x20;
pub const PACKED_MAGIC: &[u8; 8] = b"PATDATA0";
pub const STRING_TABLE_TAG: Tag = *b"_STR";

/// Header sizes legacy tools wrote in front of the string table
const LEGACY_TABLE_OFFSETS: [usize; 3] = [0x00, 0x10, 0x20];
const SCAN_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    NativeTag,
    LegacyTag,
    LegacyPacked,
    Unrecognized,
}

impl Format {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NativeTag => "native",
            Self::LegacyTag => "legacy-tag",
            Self::LegacyPacked => "legacy-packed",
            Self::Unrecognized => "unrecognized",
        }
    }
}

fn has_at(buf: &[u8], offset: usize, needle: &[u8]) -> bool {
    buf.get(offset..offset + needle.len()) == Some(needle)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Offset of the first word-aligned string-table tag in the scan window
fn scan_string_table(buf: &[u8]) -> Option<usize> {
    let limit = buf.len().min(SCAN_LIMIT);
    (0..limit)
        .step_by(4)
        .find(|&offset| has_at(buf, offset, &STRING_TABLE_TAG))
}

/// Sniffs which encoding `buf` holds. Never fails; short or foreign data is
/// `Unrecognized` and the caller reports the load failure.
pub fn detect(buf: &[u8]) -> Format {
    if has_at(buf, 0, PACKED_MAGIC) {
        return Format::LegacyPacked;
    }
    if has_at(buf, 0, NATIVE_MAGIC) {
        return Format::NativeTag;
    }
    if LEGACY_TABLE_OFFSETS
        .iter()
        .any(|&offset| has_at(buf, offset, &STRING_TABLE_TAG))
    {
        return Format::LegacyTag;
    }
    match scan_string_table(buf) {
        Some(offset) if contains(&buf[..offset], NATIVE_MAGIC) => Format::NativeTag,
        Some(_) => Format::LegacyTag,
        None => Format::Unrecognized,
    }
}

/// Where the top-level tag stream begins for a tag-based format
pub fn locate_string_table(buf: &[u8], format: Format) -> Option<usize> {
    let fixed: &[usize] = match format {
        Format::NativeTag => &[NATIVE_HEADER_SIZE],
        Format::LegacyTag => &LEGACY_TABLE_OFFSETS,
        _ => return None,
    };
    fixed
        .iter()
        .copied()
        .find(|&offset| has_at(buf, offset, &STRING_TABLE_TAG))
        .or_else(|| scan_string_table(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native_header() -> Vec<u8> {
        let mut buf = vec![0u8; NATIVE_HEADER_SIZE];
        buf[..15].copy_from_slice(NATIVE_MAGIC);
        buf
    }

    #[test]
    fn packed_magic_wins_over_later_string_table() {
        let mut buf = PACKED_MAGIC.to_vec();
        buf.resize(0x20, 0);
        buf.extend_from_slice(b"_STR");
        buf.resize(0x100, 0);
        assert_eq!(detect(&buf), Format::LegacyPacked);
    }

    #[test]
    fn native_magic_at_start() {
        let mut buf = native_header();
        buf.extend_from_slice(b"_STR");
        assert_eq!(detect(&buf), Format::NativeTag);
        assert_eq!(locate_string_table(&buf, Format::NativeTag), Some(0x20));
    }

    #[test]
    fn legacy_string_table_at_known_offsets() {
        for offset in LEGACY_TABLE_OFFSETS {
            let mut buf = vec![0u8; offset];
            buf.extend_from_slice(b"_STR\x01\0\0\0");
            assert_eq!(detect(&buf), Format::LegacyTag, "offset {offset:#x}");
            assert_eq!(locate_string_table(&buf, Format::LegacyTag), Some(offset));
        }
    }

    #[test]
    fn scan_uses_native_magic_to_disambiguate() {
        let mut relocated = vec![0u8; 8];
        relocated.extend_from_slice(NATIVE_MAGIC);
        relocated.resize(0x40, 0);
        relocated.extend_from_slice(b"_STR");
        assert_eq!(detect(&relocated), Format::NativeTag);
        assert_eq!(locate_string_table(&relocated, Format::NativeTag), Some(0x40));

        let mut legacy = vec![0xAAu8; 0x44];
        legacy.extend_from_slice(b"_STR");
        assert_eq!(detect(&legacy), Format::LegacyTag);
    }

    #[test]
    fn scan_stops_at_256_bytes() {
        let mut buf = vec![0u8; 0x104];
        buf.extend_from_slice(b"_STR");
        assert_eq!(detect(&buf), Format::Unrecognized);
    }

    #[test]
    fn short_buffers_are_unrecognized() {
        assert_eq!(detect(&[]), Format::Unrecognized);
        assert_eq!(detect(b"_ST"), Format::Unrecognized);
        assert_eq!(detect(b"PATDATA"), Format::Unrecognized);
    }
}
