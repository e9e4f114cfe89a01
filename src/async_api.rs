//! Async API for non-blocking test processing.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! unfdb = { version = "0.1", features = ["async"] }
//! ```

use crate::error::{Error, Result};
use crate::parser::{FdbParser, ParseResult};
use crate::render::RenderOptions;
use crate::ParseOptions;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}

/// Asynchronously parses a test file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> unfdb::Result<()> {
/// let result = unfdb::async_api::parse_file("exam.fdb").await?;
/// println!("Questions: {}", result.test.questions.len());
/// # Ok(())
/// # }
/// ```
pub async fn parse_file(path: impl AsRef<Path>) -> Result<ParseResult> {
    parse_file_with_options(path, &ParseOptions::default()).await
}

/// Asynchronously parses a test file with custom options.
pub async fn parse_file_with_options(path: impl AsRef<Path>, options: &ParseOptions) -> Result<ParseResult> {
    let data = fs::read(path).await?;
    parse_bytes_with_options(data, options).await
}

/// Asynchronously parses raw bytes.
pub async fn parse_bytes(data: Vec<u8>) -> Result<ParseResult> {
    parse_bytes_with_options(data, &ParseOptions::default()).await
}

/// Asynchronously parses raw bytes with custom options.
///
/// Parsing is CPU-bound and runs on the blocking pool.
pub async fn parse_bytes_with_options(data: Vec<u8>, options: &ParseOptions) -> Result<ParseResult> {
    let parser = FdbParser::new(options.clone());
    tokio::task::spawn_blocking(move || parser.parse_bytes(&data))
        .await
        .map_err(join_error)?
}

/// Asynchronously parses a test from an async reader.
pub async fn parse_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<ParseResult> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await?;
    parse_bytes(data).await
}

/// Asynchronously converts a test file to Markdown.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> unfdb::Result<()> {
/// let markdown = unfdb::async_api::to_markdown("exam.fdb").await?;
/// tokio::fs::write("exam.md", markdown).await?;
/// # Ok(())
/// # }
/// ```
pub async fn to_markdown(path: impl AsRef<Path>) -> Result<String> {
    to_markdown_with_options(path, &RenderOptions::default()).await
}

/// Asynchronously converts a test file to Markdown with custom options.
pub async fn to_markdown_with_options(path: impl AsRef<Path>, options: &RenderOptions) -> Result<String> {
    let result = parse_file(path).await?;
    let options = options.clone();
    tokio::task::spawn_blocking(move || crate::render::render_markdown(&result.test, &options))
        .await
        .map_err(join_error)?
}

/// Asynchronously re-serializes a test file as readable tagged text.
pub async fn to_text(path: impl AsRef<Path>) -> Result<String> {
    let data = fs::read(path).await?;
    tokio::task::spawn_blocking(move || {
        crate::render::render_source_bytes(&data, &ParseOptions::default())
    })
    .await
    .map_err(join_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &[u8] = b"<T_body><1><options>n=1\ntype=1\nright=1</options>\
        <value>1</value><question>Q</question><a_1>A</a_1></1></T_body>";

    #[tokio::test]
    async fn test_parse_bytes() {
        let result = parse_bytes(DOC.to_vec()).await.unwrap();
        assert_eq!(result.test.questions.len(), 1);
    }

    #[tokio::test]
    async fn test_parse_reader() {
        let result = parse_reader(DOC).await.unwrap();
        assert_eq!(result.test.questions[0].answers[0].text, "A");
    }

    #[tokio::test]
    async fn test_to_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.fdb");
        std::fs::write(&path, DOC).unwrap();
        let markdown = to_markdown(&path).await.unwrap();
        assert!(markdown.contains("**✓ 1. A**"));
        let text = to_text(&path).await.unwrap();
        assert!(text.starts_with("<T_body>\n<1>\n"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        assert!(matches!(parse_file("/nonexistent/x.fdb").await, Err(Error::Io(_))));
    }
}
