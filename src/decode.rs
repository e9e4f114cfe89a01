//! Text decoding and normalization.
//!
//! Converts bytes in a known encoding to Unicode text with `\n` line endings,
//! and cleans up escape artifacts left in already-decoded strings.

use crate::detect::{bom_length, detect_encoding, DEFAULT_ENCODING};
use encoding_rs::Encoding;
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// Decodes bytes with the given encoding and normalizes line endings.
///
/// Malformed input never fails: if the bytes are not valid in `encoding`,
/// they are decoded as UTF-8 with replacement characters instead.
pub fn decode_bytes(data: &[u8], encoding: &'static Encoding) -> String {
    let text = match encoding.decode_without_bom_handling_and_without_replacement(data) {
        Some(text) => text,
        None => String::from_utf8_lossy(data),
    };
    normalize_line_endings(&text)
}

/// Decodes a whole document, dropping a leading byte order mark.
pub fn decode_document(data: &[u8], encoding: &'static Encoding) -> String {
    let start = bom_length(data, encoding);
    decode_bytes(&data[start..], encoding)
}

/// A whole document decoded to text.
#[derive(Debug, Clone)]
pub struct DecodedDocument {
    /// Text with `\n` line endings and no byte order mark.
    pub text: String,
    /// Encoding that produced `text`.
    pub encoding: &'static Encoding,
    /// Encoding picked by detection, or the forced one.
    pub detected: &'static Encoding,
}

impl DecodedDocument {
    /// Returns true if the detected encoding was rejected for malformed bytes.
    pub fn fell_back(&self) -> bool {
        self.encoding != self.detected
    }
}

/// Decodes a whole document, detecting its encoding unless `forced` is set.
///
/// A mostly-hex Windows-1251 file samples as UTF-8 but is malformed in it;
/// when the detected encoding rejects the bytes, the default code page is
/// used instead. It maps every byte, so the retry always succeeds.
pub fn decode_detected(data: &[u8], forced: Option<&'static Encoding>) -> DecodedDocument {
    if let Some(encoding) = forced {
        return DecodedDocument {
            text: decode_document(data, encoding),
            encoding,
            detected: encoding,
        };
    }

    let detected = detect_encoding(data);
    let body = &data[bom_length(data, detected)..];

    match detected.decode_without_bom_handling_and_without_replacement(body) {
        Some(text) => DecodedDocument {
            text: normalize_line_endings(&text),
            encoding: detected,
            detected,
        },
        None => DecodedDocument {
            text: decode_bytes(body, DEFAULT_ENCODING),
            encoding: DEFAULT_ENCODING,
            detected,
        },
    }
}

/// Collapses `\r\n` and lone `\r` into `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Undoes backslash escapes left behind by upstream tooling.
///
/// Handles the literal sequences `\r\n`, `\t`, `\"`, `\'` and `\\`. Any other
/// backslash is kept as-is.
pub fn unescape_text(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('\\') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let (replacement, consumed) = if tail.starts_with("\\r\\n") {
            ('\n', 4)
        } else if tail.starts_with("\\t") {
            ('\t', 2)
        } else if tail.starts_with("\\\"") {
            ('"', 2)
        } else if tail.starts_with("\\'") {
            ('\'', 2)
        } else if tail.starts_with("\\\\") {
            ('\\', 2)
        } else {
            ('\\', 1)
        };

        result.push(replacement);
        rest = &tail[consumed..];
    }
    result.push_str(rest);

    Cow::Owned(result)
}

/// Removes control characters other than `\n` and `\t`.
///
/// Hex payloads often carry a short binary length prefix before the first tag.
pub fn strip_control_chars(text: &str) -> Cow<'_, str> {
    let is_noise = |c: char| c.is_control() && c != '\n' && c != '\t';
    if !text.chars().any(is_noise) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().filter(|&c| !is_noise(c)).collect())
}

/// Full normalization applied to text fields of a question.
///
/// Unescapes artifacts, normalizes line endings, composes to NFC and trims.
pub fn normalize_text(text: &str) -> String {
    let unescaped = unescape_text(text);
    let lines = normalize_line_endings(&unescaped);
    let cleaned = strip_control_chars(&lines);
    cleaned.nfc().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_16LE, UTF_8, WINDOWS_1251};

    #[test]
    fn test_decode_windows_1251() {
        // "Тест\r\nда" in Windows-1251
        let data = [0xD2, 0xE5, 0xF1, 0xF2, 0x0D, 0x0A, 0xE4, 0xE0];
        assert_eq!(decode_bytes(&data, WINDOWS_1251), "Тест\nда");
    }

    #[test]
    fn test_decode_invalid_utf8_falls_back() {
        let data = [b'o', b'k', 0xFF, b'!'];
        assert_eq!(decode_bytes(&data, UTF_8), "ok\u{FFFD}!");
    }

    #[test]
    fn test_decode_utf16le() {
        let data = [b'<', 0x00, b'a', 0x00, b'>', 0x00];
        assert_eq!(decode_bytes(&data, UTF_16LE), "<a>");
    }

    #[test]
    fn test_decode_document_strips_bom() {
        let data = [0xEF, 0xBB, 0xBF, b'h', b'i'];
        assert_eq!(decode_document(&data, UTF_8), "hi");
    }

    #[test]
    fn test_decode_detected_retries_default_code_page() {
        // Mostly hex digits, so the sample reads as UTF-8
        let mut data = b"<T_body>".to_vec();
        data.extend(std::iter::repeat(b'A').take(2000));
        data.extend([0xD2, 0xE5, 0xF1, 0xF2]);
        data.extend(b"</T_body>");

        let decoded = decode_detected(&data, None);
        assert_eq!(decoded.detected, UTF_8);
        assert_eq!(decoded.encoding, WINDOWS_1251);
        assert!(decoded.fell_back());
        assert!(decoded.text.ends_with("Тест</T_body>"));
    }

    #[test]
    fn test_decode_detected_keeps_valid_utf8() {
        let decoded = decode_detected("<a>Тест</a>".as_bytes(), None);
        assert_eq!(decoded.encoding, UTF_8);
        assert!(!decoded.fell_back());
        assert_eq!(decoded.text, "<a>Тест</a>");
    }

    #[test]
    fn test_decode_detected_forced() {
        let decoded = decode_detected(&[0xD2, 0xE5], Some(WINDOWS_1251));
        assert_eq!(decoded.text, "Те");
        assert!(!decoded.fell_back());
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_line_endings("plain"), "plain");
    }

    #[test]
    fn test_unescape_sequences() {
        assert_eq!(unescape_text(r"a\r\nb"), "a\nb");
        assert_eq!(unescape_text(r"col\tcol"), "col\tcol");
        assert_eq!(unescape_text(r#"say \"hi\""#), "say \"hi\"");
        assert_eq!(unescape_text(r"it\'s"), "it's");
        assert_eq!(unescape_text(r"back\\slash"), "back\\slash");
    }

    #[test]
    fn test_unescape_keeps_unknown_escapes() {
        assert_eq!(unescape_text(r"pics\photo.jpg"), r"pics\photo.jpg");
        assert!(matches!(unescape_text("nothing here"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escaped_backslash_is_not_reinterpreted() {
        // `\\t` is an escaped backslash followed by a plain `t`
        assert_eq!(unescape_text(r"a\\tb"), r"a\tb");
    }

    #[test]
    fn test_strip_control_chars() {
        assert_eq!(strip_control_chars("\u{5}\0\0\0<a>\n\tb"), "<a>\n\tb");
        assert!(matches!(strip_control_chars("clean\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_normalize_text_composes_and_trims() {
        // "й" as "и" + combining breve
        let text = "  \u{0438}\u{0306}\r\n ";
        assert_eq!(normalize_text(text), "\u{0439}");
    }
}
