//! Parsing options for test-bank documents.

use crate::detect::encoding_for_label;
use crate::dialect::Dialect;
use crate::error::Result;
use encoding_rs::Encoding;

/// Options for controlling parsing behavior.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Emit verbose diagnostics through the `log` facade.
    /// Never changes the parsed data.
    pub debug: bool,

    /// Encoding override for the whole document and every hex payload.
    /// `None` means auto-detect.
    pub encoding: Option<&'static Encoding>,

    /// Keep questions whose title is the soft-delete marker.
    pub include_deleted: bool,

    /// Tag vocabulary.
    pub dialect: Dialect,
}

impl ParseOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables verbose diagnostics.
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Forces an encoding instead of auto-detection.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Forces an encoding by label (`win1251`, `utf-8`, `cp866`, ...).
    pub fn with_encoding_label(self, label: &str) -> Result<Self> {
        Ok(self.with_encoding(encoding_for_label(label)?))
    }

    /// Keeps soft-deleted questions in the output.
    pub fn include_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Sets the tag vocabulary.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}
