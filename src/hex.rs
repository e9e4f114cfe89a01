//! Hex payload decoding.
//!
//! Question blocks and some sections are stored as hexadecimal digit pairs of
//! the raw bytes, wrapped at arbitrary widths. Decoding strips the whitespace,
//! converts the digits to bytes and decodes the bytes to text.
//!
//! Two variants exist:
//!
//! - [`decode_hex_string`] decodes with one known encoding.
//! - [`decode_hex_payload`] detects the encoding and then tries a fixed list
//!   of candidates, keeping the first one whose output still looks like
//!   tagged content.

use crate::decode::normalize_line_endings;
use crate::detect::{detect_encoding, DEFAULT_ENCODING, SECONDARY_ENCODING};
use crate::error::Result;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// Result of decoding a hex payload.
#[derive(Debug, Clone)]
pub struct HexDecoded {
    /// Decoded text with `\n` line endings.
    pub text: String,
    /// Encoding that produced `text`.
    pub encoding: &'static Encoding,
    /// False when no candidate passed the plausibility check and the
    /// default code page was used unconditionally.
    pub confident: bool,
    /// Candidates tried and rejected before `encoding`, in order.
    pub rejected: Vec<&'static Encoding>,
}

/// Returns true if `text` is non-empty and holds only hex digits and whitespace.
pub fn is_hex_payload(text: &str) -> bool {
    let mut saw_digit = false;
    for c in text.chars() {
        if c.is_ascii_hexdigit() {
            saw_digit = true;
        } else if !c.is_whitespace() {
            return false;
        }
    }
    saw_digit
}

/// Strips whitespace and converts hex digit pairs to bytes.
///
/// Fails with [`Error::MalformedHex`](crate::Error::MalformedHex) on any
/// non-hex character or an odd number of digits.
pub fn hex_to_bytes(text: &str) -> Result<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(hex::decode(digits)?)
}

/// Decodes a hex payload with a single known encoding.
pub fn decode_hex_string(text: &str, encoding: &'static Encoding) -> Result<String> {
    let bytes = hex_to_bytes(text)?;
    Ok(crate::decode::decode_bytes(&bytes, encoding))
}

/// Decodes a hex payload, auto-detecting its encoding.
///
/// With `forced` set, that encoding is used directly and the result is
/// always confident. Otherwise the detected encoding is tried first, then
/// [`candidate_encodings`].
pub fn decode_hex_payload(text: &str, forced: Option<&'static Encoding>) -> Result<HexDecoded> {
    let bytes = hex_to_bytes(text)?;

    if let Some(encoding) = forced {
        return Ok(HexDecoded {
            text: crate::decode::decode_bytes(&bytes, encoding),
            encoding,
            confident: true,
            rejected: Vec::new(),
        });
    }

    let detected = detect_encoding(&bytes);
    Ok(decode_with_candidates(&bytes, &candidate_encodings(detected)))
}

/// Builds the ordered candidate list: `detected`, then Windows-1251, UTF-8,
/// UTF-16LE, UTF-16BE and IBM866, without duplicates.
pub fn candidate_encodings(detected: &'static Encoding) -> Vec<&'static Encoding> {
    let fixed = [
        DEFAULT_ENCODING,
        UTF_8,
        UTF_16LE,
        UTF_16BE,
        SECONDARY_ENCODING,
    ];

    let mut candidates = Vec::with_capacity(fixed.len() + 1);
    candidates.push(detected);
    for encoding in fixed {
        if !candidates.contains(&encoding) {
            candidates.push(encoding);
        }
    }
    candidates
}

/// Cheap plausibility check: decoded text still contains `<` and `>`.
pub fn looks_like_tags(text: &str) -> bool {
    text.contains('<') && text.contains('>')
}

/// Tries each candidate in order and returns the first plausible decode.
///
/// A candidate is rejected when the bytes are malformed in that encoding or
/// the output fails [`looks_like_tags`]. If every candidate is rejected, the
/// default code page is used and the result is marked not confident.
pub fn decode_with_candidates(bytes: &[u8], candidates: &[&'static Encoding]) -> HexDecoded {
    let mut rejected = Vec::new();

    for &encoding in candidates {
        let accepted = encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .filter(|text| looks_like_tags(text));

        match accepted {
            Some(text) => {
                return HexDecoded {
                    text: normalize_line_endings(&text),
                    encoding,
                    confident: true,
                    rejected,
                };
            }
            None => rejected.push(encoding),
        }
    }

    HexDecoded {
        text: crate::decode::decode_bytes(bytes, DEFAULT_ENCODING),
        encoding: DEFAULT_ENCODING,
        confident: false,
        rejected,
    }
}
