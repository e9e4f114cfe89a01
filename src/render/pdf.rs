//! PDF output through an external rendering program.
//!
//! PDF layout is not done in-process. An engine receives a complete HTML
//! page and returns the PDF bytes.

use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Something that turns an HTML page into PDF bytes.
pub trait PdfEngine {
    /// Renders `html`. Relative image paths resolve against `base_dir`.
    fn render(&self, html: &str, base_dir: Option<&Path>) -> Result<Vec<u8>>;
}

/// A PDF engine that pipes HTML into an external program's stdin and reads
/// the PDF from its stdout.
#[derive(Debug, Clone)]
pub struct CommandPdfEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandPdfEngine {
    /// Creates an engine running `program` with `args`.
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `wkhtmltopdf` reading stdin and writing stdout, A4 without margins.
    pub fn wkhtmltopdf() -> Self {
        Self::new(
            "wkhtmltopdf",
            [
                "--quiet",
                "--page-size",
                "A4",
                "--margin-top",
                "0",
                "--margin-bottom",
                "0",
                "--margin-left",
                "0",
                "--margin-right",
                "0",
                "--background",
                "--enable-local-file-access",
                "-",
                "-",
            ],
        )
    }

    /// Returns the program name.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for CommandPdfEngine {
    fn default() -> Self {
        Self::wkhtmltopdf()
    }
}

impl PdfEngine for CommandPdfEngine {
    fn render(&self, html: &str, base_dir: Option<&Path>) -> Result<Vec<u8>> {
        let program = self.program.display().to_string();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = base_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Pdf(format!("Failed to run {}: {}", program, e)))?;

        // Stdin is fed from its own thread while stdout is drained
        let writer = child.stdin.take().map(|mut stdin| {
            let html = html.to_string();
            std::thread::spawn(move || stdin.write_all(html.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Pdf(format!("Failed to read output of {}: {}", program, e)))?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(Error::Pdf(format!("Failed to write to {}: {}", program, e))),
                Err(_) => return Err(Error::Pdf(format!("Writer thread for {} panicked", program))),
            }
        }

        if !output.status.success() {
            return Err(Error::Pdf(format!(
                "{} failed: {}",
                program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(Error::Pdf(format!("{} produced no output", program)));
        }
        if !output.stdout.starts_with(b"%PDF") {
            log::warn!("{} output does not start with a PDF header", program);
        }

        Ok(output.stdout)
    }
}

/// Renders a test to PDF with the given engine.
#[cfg(feature = "html")]
pub fn render_pdf(
    test: &crate::model::TestData,
    options: &super::RenderOptions,
    stylesheet: Option<&str>,
    engine: &dyn PdfEngine,
) -> Result<Vec<u8>> {
    let html = super::render_html(test, options, stylesheet)?;
    engine.render(&html, options.image_dir.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "html")]
    struct FakeEngine;

    #[cfg(feature = "html")]
    impl PdfEngine for FakeEngine {
        fn render(&self, html: &str, _base_dir: Option<&Path>) -> Result<Vec<u8>> {
            let mut pdf = b"%PDF-1.4\n".to_vec();
            pdf.extend_from_slice(html.as_bytes());
            Ok(pdf)
        }
    }

    #[test]
    fn test_missing_program_is_pdf_error() {
        let engine = CommandPdfEngine::new("unfdb-no-such-pdf-engine", Vec::<String>::new());
        let err = engine.render("<html></html>", None).unwrap_err();
        assert!(matches!(err, Error::Pdf(_)));
    }

    #[test]
    fn test_default_engine_reads_stdin() {
        let engine = CommandPdfEngine::default();
        assert_eq!(engine.program(), Path::new("wkhtmltopdf"));
        assert_eq!(engine.args[engine.args.len() - 2..], ["-", "-"]);
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_render_pdf_passes_html() {
        let test = crate::model::TestData::default();
        let pdf = render_pdf(&test, &super::super::RenderOptions::default(), None, &FakeEngine).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert!(String::from_utf8_lossy(&pdf).contains("<h1>Untitled Test</h1>"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_engine_round_trip() {
        let engine = CommandPdfEngine::new("cat", Vec::<String>::new());
        let out = engine.render("%PDF-fake", None).unwrap();
        assert_eq!(out, b"%PDF-fake");
    }
}
