//! Tag scanning for the pseudo-XML source format.
//!
//! The format is not XML: tags are plain `<name>` / `</name>` markers, never
//! carry attributes, and same-named tags only nest when the name is numeric.
//! Everything here is direct index search over the text, so scanning stays
//! linear on corrupted input.

use std::collections::HashMap;
use std::ops::Range;

/// Location of a tag pair inside a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    /// Byte range of the content between the markers.
    pub content: Range<usize>,
    /// Byte range from `<name>` through `</name>` inclusive.
    pub outer: Range<usize>,
}

/// Finds the first `<name>` at or after `from` and its following `</name>`.
pub fn find_tag(text: &str, name: &str, from: usize) -> Option<TagSpan> {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);

    let open_start = from + text.get(from..)?.find(&open)?;
    let content_start = open_start + open.len();
    let content_end = content_start + text[content_start..].find(&close)?;

    Some(TagSpan {
        content: content_start..content_end,
        outer: open_start..content_end + close.len(),
    })
}

/// Returns the content of the first `<name>...</name>` pair, if any.
///
/// Absence is a normal outcome, not an error.
pub fn extract_tag<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    find_tag(text, name, 0).map(|span| &text[span.content])
}

/// A block delimited by a numeric tag pair such as `<12>...</12>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberedBlock<'a> {
    /// Digit string exactly as written in the source.
    pub id: &'a str,
    /// Raw content between the markers.
    pub content: &'a str,
}

/// Iterator over numbered blocks in document order.
///
/// Closing markers are indexed in one pass on first use, so unbalanced
/// opening tags never trigger a rescan of the remaining text.
#[derive(Debug, Clone)]
pub struct NumberedBlocks<'a> {
    text: &'a str,
    pos: usize,
    closes: Option<HashMap<&'a str, Vec<usize>>>,
}

impl<'a> NumberedBlocks<'a> {
    /// Creates an iterator over `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            closes: None,
        }
    }

    /// Offset of the first `</id>` at or after `from`.
    fn find_close(&mut self, id: &str, from: usize) -> Option<usize> {
        let text = self.text;
        let positions = self
            .closes
            .get_or_insert_with(|| closing_markers(text))
            .get(id)?;
        let index = positions.partition_point(|&p| p < from);
        positions.get(index).copied()
    }
}

/// Indexes every `</digits>` marker by its digit string, positions ascending.
fn closing_markers(text: &str) -> HashMap<&str, Vec<usize>> {
    let bytes = text.as_bytes();
    let mut markers: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find("</") {
        let start = pos + offset;
        let digits_start = start + 2;
        let digits_len = bytes[digits_start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let digits_end = digits_start + digits_len;

        if digits_len > 0 && bytes.get(digits_end) == Some(&b'>') {
            markers
                .entry(&text[digits_start..digits_end])
                .or_default()
                .push(start);
        }
        pos = digits_start;
    }

    markers
}

impl<'a> Iterator for NumberedBlocks<'a> {
    type Item = NumberedBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;

        while self.pos < text.len() {
            let lt = self.pos + text[self.pos..].find('<')?;
            let digits_start = lt + 1;
            let digits_len = text[digits_start..]
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            let digits_end = digits_start + digits_len;

            // Not `<digits>`: step past this '<' and keep scanning
            if digits_len == 0 || text.as_bytes().get(digits_end) != Some(&b'>') {
                self.pos = digits_start;
                continue;
            }

            let id = &text[digits_start..digits_end];
            let content_start = digits_end + 1;

            match self.find_close(id, content_start) {
                Some(content_end) => {
                    // `</` + id + `>`
                    self.pos = content_end + id.len() + 3;
                    return Some(NumberedBlock {
                        id,
                        content: &text[content_start..content_end],
                    });
                }
                // Unbalanced opening tag
                None => self.pos = digits_start,
            }
        }

        None
    }
}

/// Extracts all numbered blocks of a body section, in document order.
pub fn numbered_blocks(text: &str) -> Vec<NumberedBlock<'_>> {
    NumberedBlocks::new(text).collect()
}

/// Returns true if `text` holds only ASCII digits and whitespace, with at
/// least one digit.
///
/// Such content must never be hex-decoded: `12345` is valid hex but means a
/// number.
pub fn is_purely_numeric(text: &str) -> bool {
    let mut saw_digit = false;
    for c in text.chars() {
        if c.is_ascii_digit() {
            saw_digit = true;
        } else if !c.is_whitespace() {
            return false;
        }
    }
    saw_digit
}

/// Parses `key=value` lines into `(key, value)` pairs, trimming both sides.
///
/// Lines without `=` are ignored. Keys are returned as written.
pub fn key_values(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines().filter_map(|line| {
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim()))
    })
}
