//! # unfdb
//!
//! A tolerant parser for legacy tagged test-bank exports (`.fdb` / `.et1`)
//! with Markdown, plain text, JSON and PDF output.
//!
//! The source format is a flat run of pseudo-XML sections. Question blocks
//! are usually hex-packed bytes in an unknown single-byte Cyrillic code
//! page. The parser detects the encoding, decodes every payload, and
//! rebuilds questions, answers, correctness markers, categories and groups.
//! Broken questions are dropped with a warning instead of failing the whole
//! document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unfdb::{parse_file, RenderOptions};
//!
//! fn main() -> unfdb::Result<()> {
//!     let result = parse_file("exam.fdb")?;
//!     for warning in result.warning_messages() {
//!         eprintln!("warning: {}", warning);
//!     }
//!
//!     let markdown = unfdb::render::render_markdown(&result.test, &RenderOptions::default())?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `html` (default): Markdown to HTML conversion, used for PDF output
//! - `async`: Async I/O support with Tokio

pub mod decode;
pub mod detect;
pub mod dialect;
pub mod error;
pub mod hex;
pub mod model;
pub mod parse_options;
pub mod parser;
pub mod points;
pub mod render;
pub mod tags;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use encoding_rs;
pub use detect::{detect_encoding, encoding_for_label};
pub use dialect::{Dialect, MetadataKeys};
pub use error::{Error, Result, Warning};
pub use model::{Answer, Category, Group, Question, QuestionType, TestData};
pub use parse_options::ParseOptions;
pub use parser::{FdbParser, ParseResult};
pub use points::calculate_points;
pub use render::{AnswerPrefix, CorrectAnswers, RenderOptions};

use encoding_rs::Encoding;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Parses a test file with default options.
///
/// # Example
///
/// ```no_run
/// use unfdb::parse_file;
///
/// let result = parse_file("exam.fdb")?;
/// println!("Questions: {}", result.test.questions.len());
/// # Ok::<(), unfdb::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParseResult> {
    parse_file_with_options(path, &ParseOptions::default())
}

/// Parses a test file with custom options.
pub fn parse_file_with_options(path: impl AsRef<Path>, options: &ParseOptions) -> Result<ParseResult> {
    let path = path.as_ref();
    if options.debug {
        log::debug!("Reading file: {}", path.display());
    }
    let data = std::fs::read(path)?;
    parse_bytes_with_options(&data, options)
}

/// Parses raw document bytes with default options.
pub fn parse_bytes(data: &[u8]) -> Result<ParseResult> {
    parse_bytes_with_options(data, &ParseOptions::default())
}

/// Parses raw document bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: &ParseOptions) -> Result<ParseResult> {
    FdbParser::new(options.clone()).parse_bytes(data)
}

/// Parses an already-decoded document with default options.
pub fn parse_str(text: &str) -> Result<ParseResult> {
    FdbParser::default().parse_str(text)
}

/// Parses independent files in parallel.
///
/// Results come back in input order, one per path.
pub fn parse_files<P>(paths: &[P], options: &ParseOptions) -> Vec<Result<ParseResult>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| parse_file_with_options(path, options))
        .collect()
}

/// Re-serializes a test file as readable tagged text.
///
/// # Example
///
/// ```no_run
/// let text = unfdb::to_text("exam.fdb")?;
/// std::fs::write("exam.txt", text)?;
/// # Ok::<(), unfdb::Error>(())
/// ```
pub fn to_text(path: impl AsRef<Path>) -> Result<String> {
    let data = std::fs::read(path)?;
    Ok(render::render_source_bytes(&data, &ParseOptions::default()))
}

/// Converts a test file to Markdown with default options.
///
/// # Example
///
/// ```no_run
/// use unfdb::to_markdown;
///
/// let markdown = to_markdown("exam.fdb")?;
/// std::fs::write("exam.md", markdown)?;
/// # Ok::<(), unfdb::Error>(())
/// ```
pub fn to_markdown(path: impl AsRef<Path>) -> Result<String> {
    let result = parse_file(path)?;
    render::render_markdown(&result.test, &RenderOptions::default())
}

/// Converts a test file to Markdown with custom options.
///
/// # Example
///
/// ```no_run
/// use unfdb::{to_markdown_with_options, CorrectAnswers, RenderOptions};
///
/// let options = RenderOptions::default()
///     .with_image_dir("./pics")
///     .with_correct_answers(CorrectAnswers::LeadingRight)
///     .with_frontmatter();
///
/// let markdown = to_markdown_with_options("exam.fdb", &options)?;
/// std::fs::write("exam.md", markdown)?;
/// # Ok::<(), unfdb::Error>(())
/// ```
pub fn to_markdown_with_options(path: impl AsRef<Path>, options: &RenderOptions) -> Result<String> {
    let result = parse_file(path)?;
    render::render_markdown(&result.test, options)
}

/// Converts a test file to pretty-printed JSON.
pub fn to_json(path: impl AsRef<Path>) -> Result<String> {
    parse_file(path)?.test.to_json()
}

/// Builder for parsing and rendering tests.
///
/// Provides a fluent API for configuring test processing.
///
/// # Example
///
/// ```no_run
/// use unfdb::Unfdb;
///
/// let markdown = Unfdb::new()
///     .include_deleted()
///     .with_image_dir("./pics")
///     .parse("exam.fdb")?
///     .to_markdown()?;
/// # Ok::<(), unfdb::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unfdb {
    render_options: RenderOptions,
    parse_options: ParseOptions,
}

impl Unfdb {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables verbose diagnostics through the `log` facade.
    pub fn debug(mut self) -> Self {
        self.parse_options = self.parse_options.debug();
        self
    }

    /// Forces the document encoding.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.parse_options = self.parse_options.with_encoding(encoding);
        self
    }

    /// Keeps soft-deleted questions.
    pub fn include_deleted(mut self) -> Self {
        self.parse_options = self.parse_options.include_deleted();
        self
    }

    /// Sets the tag vocabulary.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.parse_options = self.parse_options.with_dialect(dialect);
        self
    }

    /// Sets the directory prefixed to image paths.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.render_options.image_dir = Some(dir.into());
        self
    }

    /// Enables YAML frontmatter in output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options.include_frontmatter = true;
        self
    }

    /// Sets the correct-answer convention for rendering.
    pub fn with_correct_answers(mut self, convention: CorrectAnswers) -> Self {
        self.render_options.correct_answers = convention;
        self
    }

    /// Parses a test from a file path.
    pub fn parse(self, path: impl AsRef<Path>) -> Result<ParsedTest> {
        let result = parse_file_with_options(path, &self.parse_options)?;
        Ok(self.finish(result))
    }

    /// Parses a test from raw bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<ParsedTest> {
        let result = parse_bytes_with_options(data, &self.parse_options)?;
        Ok(self.finish(result))
    }

    fn finish(self, result: ParseResult) -> ParsedTest {
        ParsedTest {
            result,
            render_options: self.render_options,
        }
    }
}

/// A parsed test ready for rendering.
#[derive(Debug)]
pub struct ParsedTest {
    result: ParseResult,
    render_options: RenderOptions,
}

impl ParsedTest {
    /// Returns a reference to the parsed test.
    pub fn test(&self) -> &TestData {
        &self.result.test
    }

    /// Returns the warnings recorded while parsing.
    pub fn warnings(&self) -> &[Warning] {
        &self.result.warnings
    }

    /// Returns the warnings as display strings.
    pub fn warning_messages(&self) -> Vec<String> {
        self.result.warning_messages()
    }

    /// Returns the number of questions.
    pub fn question_count(&self) -> usize {
        self.result.test.questions.len()
    }

    /// Renders the test to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::render_markdown(&self.result.test, &self.render_options)
    }

    /// Renders the test to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        self.result.test.to_json()
    }

    /// Renders the test to a standalone HTML page.
    #[cfg(feature = "html")]
    pub fn to_html(&self, stylesheet: Option<&str>) -> Result<String> {
        render::render_html(&self.result.test, &self.render_options, stylesheet)
    }

    /// Consumes self and returns the parse result.
    pub fn into_result(self) -> ParseResult {
        self.result
    }
}
