//! Encoding detection for raw test-bank buffers.
//!
//! Detection is best-effort: it looks at byte-order marks, null bytes and
//! the density of high-range bytes, and never fails. The worst case is UTF-8.

use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// Default encoding of the source format (Windows-1251).
pub static DEFAULT_ENCODING: &Encoding = &encoding_rs::WINDOWS_1251_INIT;

/// Secondary 8-bit Cyrillic code page tried after the default (IBM866).
pub static SECONDARY_ENCODING: &Encoding = &encoding_rs::IBM866_INIT;

/// UTF-8 byte order mark.
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// UTF-16 little-endian byte order mark.
const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// UTF-16 big-endian byte order mark.
const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Number of leading bytes inspected by the density heuristic.
const SAMPLE_SIZE: usize = 1000;

/// `Ё` and `ё` in Windows-1251. In Latin-1 they read as `¨` and `¸`.
const CYRILLIC_YO: [u8; 2] = [0xA8, 0xB8];

/// Detects the likely encoding of a buffer.
///
/// Checks, in order:
/// 1. UTF-8 / UTF-16LE / UTF-16BE byte order marks
/// 2. Any null byte, which means UTF-16LE
/// 3. High-range bytes (0xC0-0xFF plus `Ё`/`ё`) against printable ASCII in
///    the first 1000 bytes; more than 10% means Windows-1251
///
/// Anything else is UTF-8.
pub fn detect_encoding(data: &[u8]) -> &'static Encoding {
    if let Some(encoding) = detect_bom(data) {
        return encoding;
    }

    if data.contains(&0x00) {
        return UTF_16LE;
    }

    let sample = &data[..data.len().min(SAMPLE_SIZE)];
    let mut high = 0usize;
    let mut ascii = 0usize;
    for &byte in sample {
        if byte >= 0xC0 || CYRILLIC_YO.contains(&byte) {
            high += 1;
        } else if (0x20..=0x7E).contains(&byte) {
            ascii += 1;
        }
    }

    // high > 10% of ascii, in integer arithmetic
    if high > 0 && high * 10 > ascii {
        DEFAULT_ENCODING
    } else {
        UTF_8
    }
}

/// Returns the encoding announced by a byte order mark, if present.
pub fn detect_bom(data: &[u8]) -> Option<&'static Encoding> {
    if data.starts_with(&UTF8_BOM) {
        Some(UTF_8)
    } else if data.starts_with(&UTF16LE_BOM) {
        Some(UTF_16LE)
    } else if data.starts_with(&UTF16BE_BOM) {
        Some(UTF_16BE)
    } else {
        None
    }
}

/// Returns the length of the byte order mark for `encoding` at the start of
/// `data`, or zero.
pub fn bom_length(data: &[u8], encoding: &'static Encoding) -> usize {
    match detect_bom(data) {
        Some(found) if found == encoding && found == UTF_8 => UTF8_BOM.len(),
        Some(found) if found == encoding => UTF16LE_BOM.len(),
        _ => 0,
    }
}

/// Resolves an encoding label.
///
/// Accepts WHATWG labels (`windows-1251`, `utf-16le`, `ibm866`, ...) and the
/// short names used by older tooling (`win1251`, `cp1251`, `utf8`,
/// `utf16le`, `utf16be`, `cp866`).
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    let normalized = label.trim().to_ascii_lowercase();
    let alias = match normalized.as_str() {
        "win1251" | "cp1251" | "windows1251" => "windows-1251",
        "utf8" => "utf-8",
        "utf16le" | "utf16" => "utf-16le",
        "utf16be" => "utf-16be",
        "cp866" | "dos866" => "ibm866",
        other => other,
    };

    Encoding::for_label(alias.as_bytes()).ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{IBM866, WINDOWS_1251};

    #[test]
    fn test_detect_utf8_bom() {
        let data = [0xEF, 0xBB, 0xBF, b'<', b'a', b'>'];
        assert_eq!(detect_encoding(&data), UTF_8);
    }

    #[test]
    fn test_detect_utf16_boms() {
        assert_eq!(detect_encoding(&[0xFF, 0xFE, b'<', 0x00]), UTF_16LE);
        assert_eq!(detect_encoding(&[0xFE, 0xFF, 0x00, b'<']), UTF_16BE);
    }

    #[test]
    fn test_detect_null_bytes_as_utf16le() {
        let data = [b'<', 0x00, b'a', 0x00, b'>', 0x00];
        assert_eq!(detect_encoding(&data), UTF_16LE);
    }

    #[test]
    fn test_detect_cyrillic_density() {
        // "Привет мир" in Windows-1251
        let data = [
            0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2, 0x20, 0xEC, 0xE8, 0xF0,
        ];
        assert_eq!(detect_encoding(&data), WINDOWS_1251);
    }

    #[test]
    fn test_detect_yo_counts_as_cyrillic() {
        let mut data = vec![0xA8; 2];
        data.extend_from_slice(b"abcdefghij");
        assert_eq!(detect_encoding(&data), WINDOWS_1251);
    }

    #[test]
    fn test_detect_plain_ascii() {
        assert_eq!(detect_encoding(b"<T_body></T_body>"), UTF_8);
        assert_eq!(detect_encoding(b""), UTF_8);
    }

    #[test]
    fn test_sparse_high_bytes_stay_utf8() {
        // One high byte against 40 ASCII characters is below 10%.
        let mut data = b"0123456789012345678901234567890123456789".to_vec();
        data.push(0xE9);
        assert_eq!(detect_encoding(&data), UTF_8);
    }

    #[test]
    fn test_only_first_1000_bytes_sampled() {
        let mut data = vec![b'a'; SAMPLE_SIZE];
        data.extend(std::iter::repeat(0xE0).take(500));
        assert_eq!(detect_encoding(&data), UTF_8);
    }

    #[test]
    fn test_encoding_labels() {
        assert_eq!(encoding_for_label("win1251").unwrap(), WINDOWS_1251);
        assert_eq!(encoding_for_label("UTF8").unwrap(), UTF_8);
        assert_eq!(encoding_for_label("utf16le").unwrap(), UTF_16LE);
        assert_eq!(encoding_for_label("cp866").unwrap(), IBM866);
        assert_eq!(encoding_for_label("koi8-r").unwrap().name(), "KOI8-R");
        assert!(matches!(
            encoding_for_label("klingon"),
            Err(Error::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_bom_length() {
        assert_eq!(bom_length(&[0xEF, 0xBB, 0xBF, b'a'], UTF_8), 3);
        assert_eq!(bom_length(&[0xFF, 0xFE, b'a', 0x00], UTF_16LE), 2);
        assert_eq!(bom_length(&[0xFF, 0xFE, b'a', 0x00], WINDOWS_1251), 0);
        assert_eq!(bom_length(b"abc", UTF_8), 0);
    }
}
