//! Payload decoding shared by every section and question block.

use crate::decode::{normalize_line_endings, strip_control_chars};
use crate::error::Result;
use crate::hex::{decode_hex_payload, is_hex_payload};
use crate::parse_options::ParseOptions;
use crate::tags::is_purely_numeric;
use encoding_rs::Encoding;

/// How a section's payload was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Numeric-only content of a numeric tag, passed through untouched.
    Verbatim,
    /// Hex-encoded bytes.
    Hex {
        /// Encoding that produced the text
        encoding: &'static Encoding,
        /// False if the candidate loop fell back unconditionally
        confident: bool,
    },
    /// Already-decoded text, only line endings normalized.
    Text,
}

/// A decoded section payload.
#[derive(Debug, Clone)]
pub struct DecodedSection {
    /// Decoded text
    pub text: String,
    /// Decoding path taken
    pub payload: Payload,
}

impl DecodedSection {
    /// Returns true if the payload was hex-decoded without a plausible match.
    pub fn is_low_confidence(&self) -> bool {
        matches!(self.payload, Payload::Hex { confident: false, .. })
    }
}

/// Decodes the raw content of `tag`.
///
/// 1. A numeric tag with only digits and whitespace is returned verbatim.
/// 2. Content made of hex digits and whitespace is hex-decoded, honoring the
///    encoding override in `options`.
/// 3. Anything else is treated as text and only has its line endings
///    normalized.
pub fn decode_section(tag: &str, raw: &str, options: &ParseOptions) -> Result<DecodedSection> {
    if options.dialect.is_numeric_tag(tag) && is_purely_numeric(raw) {
        return Ok(DecodedSection {
            text: raw.to_string(),
            payload: Payload::Verbatim,
        });
    }

    if is_hex_payload(raw) {
        let decoded = decode_hex_payload(raw, options.encoding)?;
        if options.debug && !decoded.rejected.is_empty() {
            let rejected: Vec<&str> = decoded.rejected.iter().map(|e| e.name()).collect();
            log::trace!("<{}>: rejected encodings {:?}", tag, rejected);
        }
        return Ok(DecodedSection {
            text: strip_control_chars(&decoded.text).into_owned(),
            payload: Payload::Hex {
                encoding: decoded.encoding,
                confident: decoded.confident,
            },
        });
    }

    Ok(DecodedSection {
        text: normalize_line_endings(raw),
        payload: Payload::Text,
    })
}
