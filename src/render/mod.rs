//! Output formats for parsed tests.

#[cfg(feature = "html")]
mod html;
mod markdown;
mod options;
mod pdf;
mod source;

#[cfg(feature = "html")]
pub use html::{markdown_to_html, render_html, DEFAULT_STYLESHEET};
pub use markdown::{normalize_image_name, MarkdownRenderer};
pub use options::{AnswerPrefix, CorrectAnswers, RenderOptions};
#[cfg(feature = "html")]
pub use pdf::render_pdf;
pub use pdf::{CommandPdfEngine, PdfEngine};
pub use source::{encode_output, render_source, render_source_bytes};

use crate::error::Result;
use crate::model::TestData;
use std::io::Write;
use std::path::Path;

/// Renders a test to Markdown.
pub fn render_markdown(test: &TestData, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(test)
}

/// Renders a test to Markdown and writes to a file.
pub fn render_to_file(test: &TestData, path: impl AsRef<Path>, options: &RenderOptions) -> Result<()> {
    let content = render_markdown(test, options)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Renders a test to Markdown and writes to a writer.
pub fn render_to_writer<W: Write>(test: &TestData, writer: &mut W, options: &RenderOptions) -> Result<()> {
    let content = render_markdown(test, options)?;
    writer.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_to_writer() {
        let mut out = Vec::new();
        render_to_writer(&TestData::default(), &mut out, &RenderOptions::default()).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("# Untitled Test"));
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        render_to_file(&TestData::default(), &path, &RenderOptions::default()).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("Total questions: 0"));
    }
}
