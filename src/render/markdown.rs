//! Markdown renderer implementation.

use super::{AnswerPrefix, CorrectAnswers, RenderOptions};
use crate::error::Result;
use crate::model::{Answer, Question, QuestionType, TestData};
use regex::Regex;
use std::sync::LazyLock;

/// Image marker left in question text by the parser, with an optional
/// trailing period.
static IMG_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img src='[^']*'>\.?").expect("valid regex"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));

/// Markdown renderer.
#[derive(Debug)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Creates a new renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders a test to Markdown string.
    pub fn render(&self, test: &TestData) -> Result<String> {
        let mut output = String::new();

        if self.options.include_frontmatter {
            self.render_frontmatter(test, &mut output);
        }

        output.push_str(&format!("# {}\n\n", test.title));

        if let Some(ref author) = test.author {
            output.push_str(&format!("*Author: {}*\n\n", author));
        }
        if let Some(ref date) = test.date {
            output.push_str(&format!("*Date: {}*\n\n", date));
        }
        if let Some(ref copyright) = test.copyright {
            output.push_str(&format!("*Copyright: {}*\n\n", copyright));
        }

        output.push_str(&format!("Total questions: {}\n\n", test.questions.len()));
        output.push_str("---\n\n");

        for question in &test.questions {
            self.render_question(question, &mut output);
            output.push_str("---\n\n");
        }

        Ok(output)
    }

    /// Renders YAML frontmatter.
    fn render_frontmatter(&self, test: &TestData, output: &mut String) {
        output.push_str("---\n");
        output.push_str(&format!("title: \"{}\"\n", escape_yaml(&test.title)));

        if let Some(ref author) = test.author {
            output.push_str(&format!("author: \"{}\"\n", escape_yaml(author)));
        }
        if let Some(ref date) = test.date {
            output.push_str(&format!("date: \"{}\"\n", escape_yaml(date)));
        }
        if let Some(ref copyright) = test.copyright {
            output.push_str(&format!("copyright: \"{}\"\n", escape_yaml(copyright)));
        }
        if let Some(ref id) = test.source_id {
            output.push_str(&format!("id: \"{}\"\n", escape_yaml(id)));
        }
        output.push_str(&format!("questions: {}\n", test.questions.len()));
        output.push_str(&format!("points: {}\n", test.total_points()));

        output.push_str("---\n\n");
    }

    /// Renders one question with its answers.
    fn render_question(&self, question: &Question, output: &mut String) {
        let plural = if question.points == 1 { "" } else { "s" };
        output.push_str(&format!(
            "## Question {} ({} point{})",
            question.id, question.points, plural
        ));
        if question.is_deleted && self.options.mark_deleted {
            output.push_str(" *(deleted)*");
        }
        output.push_str("\n\n");

        let text = self.question_text(question);
        if !text.is_empty() {
            output.push_str(&text);
            output.push_str("\n\n");
        }

        if self.options.include_descriptions {
            if let Some(ref description) = question.description {
                for line in description.lines() {
                    output.push_str("> ");
                    output.push_str(line);
                    output.push('\n');
                }
                output.push('\n');
            }
        }

        let right = question.right_count;
        output.push_str(&format!(
            "*Type: {} ({} correct answer{})*\n\n",
            question.question_type,
            right,
            if right == 1 { "" } else { "s" }
        ));

        let letters = match self.options.answer_prefix {
            AnswerPrefix::Auto => {
                question.question_type == QuestionType::MatchingValues && question.image.is_some()
            }
            AnswerPrefix::Numbers => false,
            AnswerPrefix::Letters => true,
        };

        for answer in &question.answers {
            let prefix = answer_prefix(answer, letters);
            if self.is_correct(question, answer) {
                output.push_str(&format!("**✓ {}. {}**\n\n", prefix, answer.text));
            } else {
                output.push_str(&format!("   {}. {}\n\n", prefix, answer.text));
            }
        }
    }

    /// Question text with the image marker turned into a Markdown image and
    /// `<br>` turned into paragraph breaks.
    fn question_text(&self, question: &Question) -> String {
        let mut text = question.text.clone();

        if let Some(ref image) = question.image {
            let image = format!(
                "\n\n![Question {} Image]({})\n\n",
                question.id,
                self.image_path(image)
            );
            text = IMG_MARKER
                .replace(&text, regex::NoExpand(&image))
                .into_owned();
        }

        LINE_BREAK.replace_all(&text, "\n\n").trim().to_string()
    }

    /// Normalizes an image path from the source and joins it to the image
    /// directory.
    fn image_path(&self, path: &str) -> String {
        let name = normalize_image_name(path);
        match self.options.image_dir {
            Some(ref dir) if !dir.as_os_str().is_empty() => {
                dir.join(&name).to_string_lossy().replace('\\', "/")
            }
            _ => name,
        }
    }

    fn is_correct(&self, question: &Question, answer: &Answer) -> bool {
        match self.options.correct_answers {
            CorrectAnswers::ValueBitmap => question.is_correct(answer.index),
            CorrectAnswers::LeadingRight => answer.number() <= question.right_count as usize,
        }
    }
}

/// Strips the `pics/` folder, lowercases a `.JPG` extension and escapes
/// spaces.
pub fn normalize_image_name(path: &str) -> String {
    let name = path
        .strip_prefix("pics/")
        .or_else(|| path.strip_prefix("pics\\"))
        .unwrap_or(path);

    let name = match name.len().checked_sub(4) {
        Some(stem) if name.is_char_boundary(stem) && name[stem..].eq_ignore_ascii_case(".jpg") => {
            format!("{}.jpg", &name[..stem])
        }
        _ => name.to_string(),
    };

    name.replace(' ', "%20")
}

/// Returns `a`, `b`, ... for letters (falling back to the number past `z`),
/// or the 1-based number.
fn answer_prefix(answer: &Answer, letters: bool) -> String {
    let number = answer.number();
    if letters && number <= 26 {
        char::from(b'a' + (number - 1) as u8).to_string()
    } else {
        number.to_string()
    }
}

/// Escapes special characters for YAML strings.
fn escape_yaml(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
