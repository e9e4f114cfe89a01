//! Test-bank document parser.
//!
//! A document is a flat run of top-level sections:
//!
//! ```text
//! <T_id>12345</T_id>
//! <info-id>...Key=Value lines...</info-id>
//! <tv_i>...indented outline...</tv_i>
//! <T_body>
//! <1>hex or text</1>
//! <2>hex or text</2>
//! </T_body>
//! <gr-id>...</gr-id>
//! ```
//!
//! Only the body section is required. Every question block is decoded and
//! parsed on its own, so a broken block costs one question and a warning.

mod groups;
mod metadata;
mod outline;
mod question;
mod section;

pub use groups::parse_groups;
pub use metadata::{parse_metadata, Metadata};
pub use outline::parse_outline;
pub use question::{
    extract_image, parse_question, parse_question_options, parse_value_bitmap, QuestionOptions,
    MAX_ANSWERS,
};
pub use section::{decode_section, DecodedSection, Payload};

use crate::decode::{decode_detected, normalize_text};
use crate::error::{Error, Result, Warning};
use crate::model::{TestData, UNTITLED};
use crate::parse_options::ParseOptions;
use crate::tags::{find_tag, NumberedBlocks};
use std::borrow::Cow;
use std::collections::HashSet;

/// Outcome of a successful parse.
#[derive(Debug)]
pub struct ParseResult {
    /// Best-effort structured test
    pub test: TestData,
    /// Recoverable problems, in document order
    pub warnings: Vec<Warning>,
    /// Soft-deleted questions left out of `test`
    pub deleted_skipped: usize,
}

impl ParseResult {
    /// Returns true if any warning was recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the warnings as display strings.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Test-bank document parser.
#[derive(Debug, Clone, Default)]
pub struct FdbParser {
    options: ParseOptions,
}

impl FdbParser {
    /// Creates a parser with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Returns the parser options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses raw document bytes.
    ///
    /// The document encoding is detected unless overridden in the options;
    /// a byte-order mark is stripped.
    pub fn parse_bytes(&self, data: &[u8]) -> Result<ParseResult> {
        let decoded = decode_detected(data, self.options.encoding);

        if self.options.debug {
            log::debug!(
                "Decoding {} bytes as {}{}",
                data.len(),
                decoded.encoding.name(),
                if self.options.encoding.is_some() { " (forced)" } else { "" }
            );
            if decoded.fell_back() {
                log::debug!(
                    "Document is malformed as {}, used {}",
                    decoded.detected.name(),
                    decoded.encoding.name()
                );
            }
        }

        self.parse_str(&decoded.text)
    }

    /// Parses an already-decoded document.
    ///
    /// Fails only when the body section is missing.
    pub fn parse_str(&self, text: &str) -> Result<ParseResult> {
        let dialect = &self.options.dialect;
        let debug = self.options.debug;

        if debug {
            log::debug!("Parsing test content ({} bytes)", text.len());
        }

        let body = find_tag(text, &dialect.body_tag, 0)
            .ok_or_else(|| Error::MissingSection(dialect.body_tag.clone()))?;

        let mut warnings = Vec::new();
        let mut test = TestData::new();

        // Top-level sections are looked up outside the body and group
        // sections, whose blocks reuse some of the same tag names
        let group = dialect
            .group_tag
            .as_deref()
            .and_then(|tag| find_tag(text, tag, 0));
        let header = without_spans(
            text,
            &[Some(body.outer.clone()), group.as_ref().map(|g| g.outer.clone())],
        );

        let metadata = dialect
            .metadata_tag
            .as_deref()
            .and_then(|tag| self.section(&header, tag, &mut warnings))
            .map(|info| parse_metadata(&info, &dialect.metadata_keys))
            .unwrap_or_default();

        test.source_id = self
            .section(&header, &dialect.id_tag, &mut warnings)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        test.title = metadata
            .title
            .or_else(|| {
                self.section(&header, &dialect.title_tag, &mut warnings)
                    .map(|title| normalize_text(&title))
                    .filter(|title| !title.is_empty())
            })
            .unwrap_or_else(|| UNTITLED.to_string());
        test.author = metadata.author;
        test.copyright = metadata.copyright;
        test.date = metadata.date;

        test.intro = dialect
            .intro_tag
            .as_deref()
            .and_then(|tag| self.section(&header, tag, &mut warnings))
            .map(|intro| normalize_text(&intro))
            .filter(|intro| !intro.is_empty());

        let (questions, deleted_skipped) = self.parse_questions(&text[body.content], &mut warnings);
        test.questions = questions;

        test.categories = dialect
            .outline_tag
            .as_deref()
            .and_then(|tag| self.section(&header, tag, &mut warnings))
            .map(|outline| parse_outline(&outline, debug))
            .unwrap_or_default();

        test.groups = match (dialect.group_tag.as_deref(), group) {
            (Some(tag), Some(span)) => self
                .decode(tag, &text[span.content], tag, &mut warnings)
                .map(|groups| parse_groups(&groups, &dialect.group_buckets)),
            _ => None,
        };

        if debug {
            log::debug!(
                "Parsed {} questions, {} categories, {} warnings",
                test.questions.len(),
                test.categories.len(),
                warnings.len()
            );
        }

        Ok(ParseResult {
            test,
            warnings,
            deleted_skipped,
        })
    }

    /// Parses every numbered block of the body section.
    fn parse_questions(
        &self,
        body: &str,
        warnings: &mut Vec<Warning>,
    ) -> (Vec<crate::model::Question>, usize) {
        let debug = self.options.debug;
        let mut questions = Vec::new();
        let mut seen = HashSet::new();
        let mut deleted_skipped = 0;

        for block in NumberedBlocks::new(body) {
            let id = block.id;

            if !seen.insert(id) {
                warnings.push(Warning::DuplicateQuestion { id: id.to_string() });
                continue;
            }

            let decoded = match decode_section(id, block.content, &self.options) {
                Ok(decoded) => decoded,
                Err(reason) => {
                    warnings.push(Warning::QuestionSkipped {
                        id: id.to_string(),
                        reason,
                    });
                    continue;
                }
            };
            // Dropped along with a skipped deleted question
            let mut question_warnings = Vec::new();
            push_ambiguity(&decoded, || format!("question {}", id), &mut question_warnings);

            match parse_question(id, &decoded.text, &mut question_warnings) {
                Ok(question) if question.is_deleted && !self.options.include_deleted => {
                    if debug {
                        log::debug!("Skipping deleted question {}", id);
                    }
                    deleted_skipped += 1;
                }
                Ok(question) => {
                    if debug && question.correct_answers.len() != question.right_count as usize {
                        log::debug!(
                            "Question {}: {} answers flagged correct, right={}",
                            id,
                            question.correct_answers.len(),
                            question.right_count
                        );
                    }
                    warnings.append(&mut question_warnings);
                    questions.push(question);
                }
                Err(reason) => {
                    if debug {
                        log::debug!("Error parsing question {}: {}", id, reason);
                    }
                    warnings.append(&mut question_warnings);
                    warnings.push(Warning::QuestionSkipped {
                        id: id.to_string(),
                        reason,
                    });
                }
            }
        }

        (questions, deleted_skipped)
    }

    /// Extracts and decodes an optional top-level section.
    fn section(&self, text: &str, tag: &str, warnings: &mut Vec<Warning>) -> Option<String> {
        let span = find_tag(text, tag, 0)?;
        self.decode(tag, &text[span.content], tag, warnings)
    }

    /// Decodes a section payload, turning failures into warnings.
    fn decode(
        &self,
        tag: &str,
        raw: &str,
        context: &str,
        warnings: &mut Vec<Warning>,
    ) -> Option<String> {
        match decode_section(tag, raw, &self.options) {
            Ok(decoded) => {
                push_ambiguity(&decoded, || format!("<{}>", context), warnings);
                Some(decoded.text)
            }
            Err(reason) => {
                warnings.push(Warning::SectionDecode {
                    tag: tag.to_string(),
                    reason,
                });
                None
            }
        }
    }
}

/// Records an ambiguity warning for a hex payload decoded by fallback.
fn push_ambiguity(
    decoded: &DecodedSection,
    context: impl FnOnce() -> String,
    warnings: &mut Vec<Warning>,
) {
    if let Payload::Hex {
        encoding,
        confident: false,
    } = decoded.payload
    {
        warnings.push(Warning::EncodingAmbiguity {
            context: context(),
            fallback: encoding.name(),
        });
    }
}

/// Returns `text` with the given byte ranges removed.
pub(crate) fn without_spans<'a>(
    text: &'a str,
    spans: &[Option<std::ops::Range<usize>>],
) -> Cow<'a, str> {
    let mut spans: Vec<_> = spans.iter().flatten().cloned().collect();
    if spans.is_empty() {
        return Cow::Borrowed(text);
    }
    spans.sort_by_key(|span| span.start);

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for span in spans {
        if span.start > pos {
            out.push_str(&text[pos..span.start]);
        }
        pos = pos.max(span.end);
    }
    out.push_str(&text[pos..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;

    const SINGLE: &str = "<T_body><1><options>n=2\ntype=1\nright=1</options>\
        <value>1\n0</value><question>Pick one</question><a_1>Yes</a_1><a_2>No</a_2></1></T_body>";

    fn parse(text: &str) -> ParseResult {
        FdbParser::default().parse_str(text).unwrap()
    }

    #[test]
    fn test_minimal_document() {
        let result = parse(SINGLE);
        assert!(!result.has_warnings());
        assert_eq!(result.test.title, UNTITLED);
        assert_eq!(result.test.questions.len(), 1);
        let question = &result.test.questions[0];
        assert_eq!(question.question_type, QuestionType::SingleChoice);
        assert!(result.test.groups.is_none());
        assert!(result.test.categories.is_empty());
    }

    #[test]
    fn test_missing_body_is_fatal() {
        let err = FdbParser::default()
            .parse_str("<T_title>x</T_title>")
            .unwrap_err();
        assert!(matches!(err, Error::MissingSection(ref tag) if tag == "T_body"));
        assert_eq!(err.to_string(), "Invalid test file: no T_body section found");
    }

    #[test]
    fn test_empty_body_is_not_fatal() {
        let result = parse("<T_body></T_body>");
        assert!(result.test.questions.is_empty());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_duplicate_block_keeps_first() {
        let text = "<T_body>\
            <1><options>n=1\ntype=1\nright=1</options><value>1</value><question>A</question><a_1>x</a_1></1>\
            <1><options>n=1\ntype=1\nright=1</options><value>1</value><question>B</question><a_1>x</a_1></1>\
            </T_body>";
        let result = parse(text);
        assert_eq!(result.test.questions.len(), 1);
        assert_eq!(result.test.questions[0].text, "A");
        assert!(matches!(result.warnings[0], Warning::DuplicateQuestion { .. }));
    }

    #[test]
    fn test_malformed_hex_block_is_skipped() {
        // Digits only, odd length: hex-shaped but undecodable
        let text = format!("<T_body><7>abc</7>{}", &SINGLE["<T_body>".len()..]);
        let result = parse(&text);
        assert_eq!(result.test.questions.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].question_id(), Some("7"));
        assert!(result.warning_messages()[0].starts_with("Error parsing question 7: Malformed hex"));
    }

    #[test]
    fn test_metadata_and_header_sections() {
        let text = format!(
            "<T_id>12345</T_id>\n<T_title>Fallback</T_title>\n\
             <info-id>Название=Сети\nАвторы=Иванов</info-id>\n\
             <intro-id>Hello\\r\\nworld</intro-id>\n\
             <tv_i>Top\n\t1</tv_i>\n{}",
            SINGLE
        );
        let result = parse(&text);
        let test = &result.test;
        assert_eq!(test.title, "Сети");
        assert_eq!(test.author.as_deref(), Some("Иванов"));
        assert_eq!(test.source_id.as_deref(), Some("12345"));
        assert_eq!(test.intro.as_deref(), Some("Hello\nworld"));
        assert_eq!(test.categories[0].question_ids, vec!["1"]);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_title_falls_back_to_title_tag() {
        let text = format!("<T_title> Fallback </T_title>{}", SINGLE);
        assert_eq!(parse(&text).test.title, "Fallback");
    }

    #[test]
    fn test_hex_title_section() {
        let text = format!("<T_title>{}</T_title>{}", hex::encode("<Title>"), SINGLE);
        assert_eq!(parse(&text).test.title, "<Title>");
    }

    #[test]
    fn test_group_section_does_not_leak_into_outline() {
        let text = format!("{}<gr-id><0><tv_i>1</tv_i><tv_p>2</tv_p></0></gr-id>", SINGLE);
        let result = parse(&text);
        assert!(result.test.categories.is_empty());
        let groups = result.test.groups.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].question_ids.tv_i, vec!["1"]);
        assert_eq!(groups[0].question_ids.tv_p, vec!["2"]);
    }

    #[test]
    fn test_body_only_dialect_ignores_optional_sections() {
        let options = ParseOptions::new().with_dialect(crate::dialect::Dialect::body_only());
        let text = format!("<info-id>Название=X</info-id><tv_i>A</tv_i>{}<gr-id></gr-id>", SINGLE);
        let result = FdbParser::new(options).parse_str(&text).unwrap();
        assert_eq!(result.test.title, UNTITLED);
        assert!(result.test.categories.is_empty());
        assert!(result.test.groups.is_none());
    }

    #[test]
    fn test_skipped_deleted_question_drops_its_warnings() {
        let text = "<T_body><2><Q_TITLE>Deleted!</Q_TITLE><options>n=3\ntype=1\nright=1</options>\
            <value>1</value><question>Old</question><a_1>x</a_1></2></T_body>";
        let result = parse(text);
        assert!(result.test.questions.is_empty());
        assert_eq!(result.deleted_skipped, 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_parse_bytes_recovers_misdetected_code_page() {
        let mut data = b"<T_body><1>".to_vec();
        data.extend(hex::encode_upper(
            "<options>n=1\ntype=1\nright=1</options><value>1</value><question>Q</question><a_1>A</a_1>",
        ).bytes());
        data.extend(b"</1></T_body><T_title>");
        // "Тест" in Windows-1251
        data.extend([0xD2, 0xE5, 0xF1, 0xF2]);
        data.extend(b"</T_title>");

        let result = FdbParser::default().parse_bytes(&data).unwrap();
        assert_eq!(result.test.title, "Тест");
        assert_eq!(result.test.questions.len(), 1);
    }

    #[test]
    fn test_ambiguous_hex_block_warns() {
        // Decodes under every candidate but never shows tag brackets
        let text = format!("<T_body><3>{}</3></T_body>", hex::encode("plain"));
        let result = parse(&text);
        assert!(result.test.questions.is_empty());
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::EncodingAmbiguity { context, .. } if context == "question 3")));
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::QuestionSkipped { id, .. } if id == "3")));
    }

    #[test]
    fn test_without_spans() {
        assert_eq!(without_spans("abcdef", &[Some(1..3), None, Some(4..5)]), "adf");
        assert_eq!(without_spans("abc", &[None]), "abc");
    }
}
