//! Rendering options for Markdown output.

use std::path::PathBuf;

/// Options for Markdown rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Directory prefixed to image paths.
    /// If None, image paths are emitted relative as found in the source.
    pub image_dir: Option<PathBuf>,

    /// Whether to include metadata as YAML frontmatter.
    pub include_frontmatter: bool,

    /// Which answers are highlighted as correct.
    pub correct_answers: CorrectAnswers,

    /// How answers are numbered.
    pub answer_prefix: AnswerPrefix,

    /// Whether to flag soft-deleted questions in their heading.
    pub mark_deleted: bool,

    /// Whether to render question descriptions.
    pub include_descriptions: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_dir: None,
            include_frontmatter: false,
            correct_answers: CorrectAnswers::ValueBitmap,
            answer_prefix: AnswerPrefix::Auto,
            mark_deleted: true,
            include_descriptions: true,
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the image base directory.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    /// Enables YAML frontmatter output.
    pub fn with_frontmatter(mut self) -> Self {
        self.include_frontmatter = true;
        self
    }

    /// Sets the correct-answer convention.
    pub fn with_correct_answers(mut self, convention: CorrectAnswers) -> Self {
        self.correct_answers = convention;
        self
    }

    /// Sets the answer prefix style.
    pub fn with_answer_prefix(mut self, prefix: AnswerPrefix) -> Self {
        self.answer_prefix = prefix;
        self
    }

    /// Omits question descriptions.
    pub fn without_descriptions(mut self) -> Self {
        self.include_descriptions = false;
        self
    }
}

/// Conventions for deciding which answers are correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectAnswers {
    /// Positions flagged `1` in the `<value>` bitmap.
    ValueBitmap,
    /// The first `right` answers.
    LeadingRight,
}

impl Default for CorrectAnswers {
    fn default() -> Self {
        Self::ValueBitmap
    }
}

/// Answer numbering styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPrefix {
    /// Letters for matching-values questions with an image, numbers otherwise.
    Auto,
    /// Always `1.`, `2.`, ...
    Numbers,
    /// Always `a.`, `b.`, ...
    Letters,
}

impl Default for AnswerPrefix {
    fn default() -> Self {
        Self::Auto
    }
}
