//! Plain-text re-serialization of a source document.
//!
//! Keeps the tag layout of the source and replaces every payload with its
//! decoded text, so that a hex-packed export becomes readable:
//!
//! ```text
//! <T_id>
//! 12345
//! </T_id>
//!
//! <T_body>
//! <1>
//! <options>...
//! </1>
//!
//! </T_body>
//! ```

use crate::decode::{decode_detected, normalize_line_endings};
use crate::parse_options::ParseOptions;
use crate::parser::{decode_section, without_spans};
use crate::tags::{find_tag, NumberedBlocks};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};

/// Re-serializes raw document bytes, detecting the encoding unless it is
/// forced in `options`.
pub fn render_source_bytes(data: &[u8], options: &ParseOptions) -> String {
    render_source(&decode_detected(data, options.encoding).text, options)
}

/// Re-serializes an already-decoded document.
///
/// Header sections come first in vocabulary order, then the body with one
/// decoded block per question, then the group section. Absent sections are
/// left out. A payload that fails to decode is written as found.
pub fn render_source(text: &str, options: &ParseOptions) -> String {
    let dialect = &options.dialect;
    let mut output = String::new();

    let body = find_tag(text, &dialect.body_tag, 0);
    let group = dialect
        .group_tag
        .as_deref()
        .and_then(|tag| find_tag(text, tag, 0));
    let header = without_spans(
        text,
        &[
            body.as_ref().map(|b| b.outer.clone()),
            group.as_ref().map(|g| g.outer.clone()),
        ],
    );

    for tag in &dialect.header_tags {
        if let Some(span) = find_tag(&header, tag, 0) {
            let payload = decode_or_raw(tag, &header[span.content], options);
            push_section(&mut output, tag, &payload);
        }
    }

    if let Some(span) = body {
        output.push_str(&format!("<{}>\n", dialect.body_tag));
        for block in NumberedBlocks::new(&text[span.content]) {
            let payload = decode_or_raw(block.id, block.content, options);
            push_section(&mut output, block.id, &payload);
        }
        output.push_str(&format!("</{}>\n\n", dialect.body_tag));
    }

    if let (Some(tag), Some(span)) = (dialect.group_tag.as_deref(), group) {
        let payload = decode_or_raw(tag, &text[span.content], options);
        push_section(&mut output, tag, &payload);
    }

    output
}

/// Encodes re-serialized text for writing.
///
/// Characters the target cannot represent become numeric character
/// references. UTF-16 targets get no byte-order mark.
pub fn encode_output(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    if encoding == UTF_16LE {
        return text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    }
    if encoding == UTF_16BE {
        return text.encode_utf16().flat_map(u16::to_be_bytes).collect();
    }

    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        log::debug!("Unmappable characters replaced while encoding to {}", encoding.name());
    }
    bytes.into_owned()
}

fn decode_or_raw(tag: &str, raw: &str, options: &ParseOptions) -> String {
    match decode_section(tag, raw, options) {
        Ok(decoded) => decoded.text,
        Err(err) => {
            if options.debug {
                log::debug!("<{}> written undecoded: {}", tag, err);
            }
            normalize_line_endings(raw)
        }
    }
}

fn push_section(output: &mut String, tag: &str, payload: &str) {
    output.push_str(&format!("<{}>\n{}\n</{}>\n\n", tag, payload, tag));
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1251};

    #[test]
    fn test_render_source_layout() {
        let block = hex::encode("<options>n=1</options>");
        let text = format!(
            "<gr-id><0><tv_i>1</tv_i></0></gr-id><T_body>\r\n<1>{}</1>\r\n</T_body><T_id>12345</T_id>",
            block
        );
        let output = render_source(&text, &ParseOptions::default());
        assert_eq!(
            output,
            "<T_id>\n12345\n</T_id>\n\n\
             <T_body>\n<1>\n<options>n=1</options>\n</1>\n\n</T_body>\n\n\
             <gr-id>\n<0><tv_i>1</tv_i></0>\n</gr-id>\n\n"
        );
    }

    #[test]
    fn test_header_order_follows_vocabulary() {
        let text = "<T_title>B</T_title><T_id>1</T_id>";
        let output = render_source(text, &ParseOptions::default());
        let id = output.find("<T_id>").unwrap();
        let title = output.find("<T_title>").unwrap();
        assert!(id < title);
        assert!(!output.contains("<T_body>"));
    }

    #[test]
    fn test_undecodable_payload_is_kept() {
        let text = "<T_body><1>abc</1></T_body>";
        let output = render_source(text, &ParseOptions::default());
        assert!(output.contains("<1>\nabc\n</1>"));
    }

    #[test]
    fn test_render_source_bytes_win1251() {
        let (bytes, _, _) = WINDOWS_1251.encode("<T_title>Сети</T_title>");
        let output = render_source_bytes(&bytes, &ParseOptions::default());
        assert_eq!(output, "<T_title>\nСети\n</T_title>\n\n");
    }

    #[test]
    fn test_encode_output() {
        assert_eq!(encode_output("Да", WINDOWS_1251), vec![0xC4, 0xE0]);
        assert_eq!(encode_output("Да", UTF_8), "Да".as_bytes());
        assert_eq!(encode_output("A", UTF_16LE), vec![0x41, 0x00]);
        assert_eq!(encode_output("A", UTF_16BE), vec![0x00, 0x41]);
    }
}
