//! Error and warning types for unfdb library.

use std::io;
use thiserror::Error;

/// Result type alias for unfdb operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unfdb library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required top-level section (e.g. the body) is absent.
    #[error("Invalid test file: no {0} section found")]
    MissingSection(String),

    /// A hex payload contains non-hex characters or has odd length.
    #[error("Malformed hex payload: {0}")]
    MalformedHex(String),

    /// A required sub-tag of a question block is absent.
    #[error("Missing required field <{0}>")]
    MissingField(&'static str),

    /// A required `key=value` entry is missing or not a number.
    #[error("Invalid or missing option '{key}' in <{tag}>")]
    InvalidField { tag: &'static str, key: &'static str },

    /// The requested encoding label is not known.
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// Invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Rendering to an output format failed.
    #[error("Render error: {0}")]
    Render(String),

    /// The external PDF engine failed.
    #[error("PDF engine error: {0}")]
    Pdf(String),
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Error::MalformedHex(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(err.to_string())
    }
}

/// A recoverable problem found while parsing.
///
/// Warnings never abort a parse. They are collected in document order and
/// returned next to the best-effort result.
#[derive(Error, Debug)]
pub enum Warning {
    /// A question block could not be parsed and was dropped.
    #[error("Error parsing question {id}: {reason}")]
    QuestionSkipped { id: String, reason: Error },

    /// A question block reused an ID already seen; the later block was dropped.
    #[error("Duplicate question {id}: later block ignored")]
    DuplicateQuestion { id: String },

    /// An `<a_i>` tag announced by `n=` is absent.
    #[error("Question {id}: missing answer <a_{number}>")]
    MissingAnswer { id: String, number: u32 },

    /// No candidate encoding produced tag-shaped text; a fallback was used.
    #[error("Ambiguous encoding for {context}: fell back to {fallback}")]
    EncodingAmbiguity {
        context: String,
        fallback: &'static str,
    },

    /// An optional section could not be decoded and was ignored.
    #[error("Could not decode <{tag}>: {reason}")]
    SectionDecode { tag: String, reason: Error },
}

impl Warning {
    /// Returns the question ID this warning refers to, if any.
    pub fn question_id(&self) -> Option<&str> {
        match self {
            Warning::QuestionSkipped { id, .. }
            | Warning::DuplicateQuestion { id }
            | Warning::MissingAnswer { id, .. } => Some(id),
            Warning::EncodingAmbiguity { .. } | Warning::SectionDecode { .. } => None,
        }
    }
}
