//! Decoding of a single question block.
//!
//! A decoded block looks like:
//!
//! ```text
//! <options>
//! n=4
//! type=2
//! right=2
//! max=1
//! </options>
//! <value>
//! 1
//! 0
//! 1
//! 0
//! </value>
//! <question>Text <img src='pics\1.jpg'></question>
//! <Q_TITLE>...</Q_TITLE>
//! <description>...</description>
//! <a_1>...</a_1> ... <a_4>...</a_4>
//! ```

use crate::decode::normalize_text;
use crate::error::{Error, Result, Warning};
use crate::model::{Answer, Question, QuestionType, DELETED_MARKER};
use crate::points::calculate_points;
use crate::tags::{extract_tag, key_values};
use regex::Regex;
use std::sync::LazyLock;

/// Upper bound on `n=`; larger values are treated as corruption.
pub const MAX_ANSWERS: u32 = 1000;

/// Embedded image marker, e.g. `<img src='pics\12.JPG'>`.
static IMG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\s+src\s*=\s*['"]([^'"]*)['"]\s*/?>"#).expect("valid regex")
});

/// Values parsed from the `<options>` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionOptions {
    /// Number of answers
    pub n: u32,
    /// Question type
    pub question_type: QuestionType,
    /// Required correct answers
    pub right: u32,
    /// Point weight, 1 when absent
    pub max: u32,
}

/// Parses the `key=value` lines of an `<options>` block.
///
/// `n`, `type` and `right` are required; `max` defaults to 1.
pub fn parse_question_options(text: &str) -> Result<QuestionOptions> {
    let mut n = None;
    let mut type_code = None;
    let mut right = None;
    let mut max = None;

    for (key, value) in key_values(text) {
        let slot = match key {
            "n" => &mut n,
            "type" => &mut type_code,
            "right" => &mut right,
            "max" => &mut max,
            _ => continue,
        };
        if slot.is_none() {
            *slot = value.parse::<u32>().ok();
        }
    }

    let required = |value: Option<u32>, key: &'static str| {
        value.ok_or(Error::InvalidField {
            tag: "options",
            key,
        })
    };

    let n = required(n, "n")?;
    if n > MAX_ANSWERS {
        return Err(Error::InvalidField {
            tag: "options",
            key: "n",
        });
    }

    Ok(QuestionOptions {
        n,
        question_type: QuestionType::from_code(required(type_code, "type")?),
        right: required(right, "right")?,
        max: max.unwrap_or(1),
    })
}

/// Parses a `<value>` bitmap into sorted 0-based correct positions.
///
/// Blank lines are skipped before positions are counted; any line other
/// than `1` counts as not correct. An empty bitmap yields no positions.
pub fn parse_value_bitmap(text: &str) -> Vec<usize> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .filter(|(_, line)| line.parse::<u32>() == Ok(1))
        .map(|(index, _)| index)
        .collect()
}

/// Finds the embedded image marker.
///
/// Returns the text with the marker's path rewritten to forward slashes,
/// and that path.
pub fn extract_image(text: &str) -> (String, Option<String>) {
    let Some(captures) = IMG_PATTERN.captures(text) else {
        return (text.to_string(), None);
    };

    let path = captures[1].replace('\\', "/");
    let marker = format!("<img src='{}'>", path);
    let rewritten = IMG_PATTERN.replace(text, regex::NoExpand(&marker)).into_owned();
    (rewritten, Some(path))
}

/// Parses one decoded question block.
///
/// Missing `<a_N>` tags shrink the answer list and push a
/// [`Warning::MissingAnswer`]; every other problem is returned as an error
/// so the caller can drop the question.
pub fn parse_question(id: &str, content: &str, warnings: &mut Vec<Warning>) -> Result<Question> {
    let options_text = extract_tag(content, "options").ok_or(Error::MissingField("options"))?;
    let options = parse_question_options(options_text)?;

    let value_text = extract_tag(content, "value").ok_or(Error::MissingField("value"))?;
    let correct_answers = parse_value_bitmap(value_text);

    let question_text = extract_tag(content, "question").ok_or(Error::MissingField("question"))?;
    let (question_text, image) = extract_image(question_text);
    let text = normalize_text(&question_text);

    let title = extract_tag(content, "Q_TITLE")
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string);
    let is_deleted = title.as_deref() == Some(DELETED_MARKER);

    let description = extract_tag(content, "description")
        .map(normalize_text)
        .filter(|description| !description.is_empty());

    let mut answers = Vec::with_capacity(options.n as usize);
    for number in 1..=options.n {
        match extract_tag(content, &format!("a_{}", number)) {
            Some(answer) => answers.push(Answer::from_number(number as usize, normalize_text(answer))),
            None => warnings.push(Warning::MissingAnswer {
                id: id.to_string(),
                number,
            }),
        }
    }

    Ok(Question {
        id: id.to_string(),
        title,
        question_type: options.question_type,
        text,
        image,
        description,
        answers,
        correct_answers,
        answer_count: options.n,
        right_count: options.right,
        max_attempts: options.max,
        points: calculate_points(options.question_type, options.right),
        is_deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "<options>\nn=2\ntype=1\nright=1\n</options>\
        <value>\n1\n0\n</value>\
        <question>\nPick one\n</question>\
        <a_1>\nYes\n\n\n</a_1><a_2>No</a_2>";

    #[test]
    fn test_parse_options() {
        let options = parse_question_options("n=4\r\ntype=7\r\nright=4\r\nmax=2").unwrap();
        assert_eq!(options.n, 4);
        assert_eq!(options.question_type, QuestionType::TextInput);
        assert_eq!(options.right, 4);
        assert_eq!(options.max, 2);
    }

    #[test]
    fn test_parse_options_default_max() {
        let options = parse_question_options("n=2\ntype=1\nright=1").unwrap();
        assert_eq!(options.max, 1);
    }

    #[test]
    fn test_parse_options_missing_right() {
        let err = parse_question_options("n=2\ntype=1").unwrap_err();
        assert!(matches!(err, Error::InvalidField { key: "right", .. }));
    }

    #[test]
    fn test_parse_options_non_numeric() {
        let err = parse_question_options("n=two\ntype=1\nright=1").unwrap_err();
        assert!(matches!(err, Error::InvalidField { key: "n", .. }));
    }

    #[test]
    fn test_parse_options_rejects_absurd_count() {
        assert!(parse_question_options("n=4000000000\ntype=1\nright=1").is_err());
    }

    #[test]
    fn test_value_bitmap() {
        assert_eq!(parse_value_bitmap("\n1\n0\n1\n0\n"), vec![0, 2]);
        assert_eq!(parse_value_bitmap("0\n\n1"), vec![1]);
        assert!(parse_value_bitmap("").is_empty());
        assert!(parse_value_bitmap("\n  \n").is_empty());
    }

    #[test]
    fn test_extract_image_normalizes_path() {
        let (text, image) = extract_image("See <img src='pics\\12.JPG'>. Done");
        assert_eq!(image.as_deref(), Some("pics/12.JPG"));
        assert_eq!(text, "See <img src='pics/12.JPG'>. Done");
    }

    #[test]
    fn test_extract_image_absent() {
        let (text, image) = extract_image("No picture");
        assert_eq!(text, "No picture");
        assert!(image.is_none());
    }

    #[test]
    fn test_parse_question_basic() {
        let mut warnings = Vec::new();
        let question = parse_question("1", BLOCK, &mut warnings).unwrap();
        assert_eq!(question.id, "1");
        assert_eq!(question.question_type, QuestionType::SingleChoice);
        assert_eq!(question.text, "Pick one");
        assert_eq!(question.answers.len(), 2);
        assert_eq!(question.answers[0].text, "Yes");
        assert_eq!(question.correct_answers, vec![0]);
        assert_eq!(question.points, 1);
        assert!(question.title.is_none());
        assert!(!question.is_deleted);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_answer_keeps_others() {
        let block = "<options>n=3\ntype=2\nright=2</options><value>1\n0\n1</value>\
            <question>Q</question><a_1>one</a_1><a_3>three</a_3>";
        let mut warnings = Vec::new();
        let question = parse_question("5", block, &mut warnings).unwrap();
        let numbers: Vec<_> = question.answers.iter().map(|a| a.number()).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(question.answers[1].index, 2);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], Warning::MissingAnswer { number: 2, .. }));
    }

    #[test]
    fn test_required_fields() {
        let mut warnings = Vec::new();
        let no_value = "<options>n=1\ntype=1\nright=1</options><question>Q</question>";
        assert!(matches!(
            parse_question("1", no_value, &mut warnings),
            Err(Error::MissingField("value"))
        ));

        let no_question = "<options>n=1\ntype=1\nright=1</options><value>1</value>";
        assert!(matches!(
            parse_question("1", no_question, &mut warnings),
            Err(Error::MissingField("question"))
        ));

        assert!(matches!(
            parse_question("1", "<value>1</value>", &mut warnings),
            Err(Error::MissingField("options"))
        ));
    }

    #[test]
    fn test_deleted_title_and_description() {
        let block = format!(
            "{}<Q_TITLE> Deleted! </Q_TITLE><description>\r\nwhy\r\n</description>",
            BLOCK
        );
        let mut warnings = Vec::new();
        let question = parse_question("2", &block, &mut warnings).unwrap();
        assert!(question.is_deleted);
        assert_eq!(question.title.as_deref(), Some("Deleted!"));
        assert_eq!(question.description.as_deref(), Some("why"));
    }

    #[test]
    fn test_empty_description_is_none() {
        let block = format!("{}<description>\n</description>", BLOCK);
        let mut warnings = Vec::new();
        let question = parse_question("2", &block, &mut warnings).unwrap();
        assert!(question.description.is_none());
    }
}
