use encoding_rs::SHIFT_JIS;

/// Fixed name record width in the packed format
pub const NAME_RECORD_SIZE: usize = 64;

/// Decodes legacy code-page text: cut at the first NUL, map to UTF-8,
/// drop trailing whitespace. Undecodable bytes become U+FFFD.
pub fn decode_legacy_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(&bytes[..end]);
    if had_errors {
        log::debug!("lossy legacy text: {:?}", text);
    }
    text.trim_end().to_string()
}

/// One fixed-width record; a record that is all padding yields ""
pub fn decode_name_record(record: &[u8]) -> String {
    let len = record.len().min(NAME_RECORD_SIZE);
    decode_legacy_text(&record[..len])
}

/// Encodes text back to the legacy code page for the native writer
pub fn encode_legacy_text(text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    if had_errors {
        log::warn!("text not representable in the legacy code page: {:?}", text);
    }
    bytes.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuts_at_nul_and_trims() {
        assert_eq!(decode_legacy_text(b"Jump  \0garbage"), "Jump");
        assert_eq!(decode_legacy_text(b"   \0"), "");
        assert_eq!(decode_legacy_text(b""), "");
    }

    #[test]
    fn decodes_double_byte_text() {
        // "立ち" (standing)
        let bytes = [0x97, 0xA7, 0x82, 0xBF, 0x00];
        assert_eq!(decode_legacy_text(&bytes), "立ち");
        assert_eq!(encode_legacy_text("立ち"), bytes[..4].to_vec());
    }

    #[test]
    fn half_width_katakana_is_single_byte() {
        assert_eq!(decode_legacy_text(&[0xB1]), "ｱ");
    }

    #[test]
    fn name_record_is_limited_to_record_width() {
        let mut record = vec![b'A'; NAME_RECORD_SIZE + 8];
        record[3] = b' ';
        assert_eq!(decode_name_record(&record).len(), NAME_RECORD_SIZE);
        assert_eq!(decode_name_record(&[0u8; NAME_RECORD_SIZE]), "");
    }
}
