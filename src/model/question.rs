//! Questions, question types and answers.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Title value that marks a question as soft-deleted.
pub const DELETED_MARKER: &str = "Deleted!";

/// Question type as encoded by `type=` in `<options>`.
///
/// Codes 1-7 are part of the file format and round-trip exactly. Unknown codes
/// are kept in [`QuestionType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub enum QuestionType {
    /// Pick exactly one answer (1)
    SingleChoice,
    /// Pick several answers (2)
    MultipleChoice,
    /// Order the answers (3)
    Ranking,
    /// Single choice laid out in two columns (4)
    MatchingColumns,
    /// Match pairs (5)
    MatchingPairs,
    /// Match pairs against values (6)
    MatchingValues,
    /// Free-form text answer (7)
    TextInput,
    /// Any other code
    Other(u32),
}

impl QuestionType {
    /// Maps a wire code to a question type.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::SingleChoice,
            2 => Self::MultipleChoice,
            3 => Self::Ranking,
            4 => Self::MatchingColumns,
            5 => Self::MatchingPairs,
            6 => Self::MatchingValues,
            7 => Self::TextInput,
            other => Self::Other(other),
        }
    }

    /// Returns the wire code.
    pub fn code(self) -> u32 {
        match self {
            Self::SingleChoice => 1,
            Self::MultipleChoice => 2,
            Self::Ranking => 3,
            Self::MatchingColumns => 4,
            Self::MatchingPairs => 5,
            Self::MatchingValues => 6,
            Self::TextInput => 7,
            Self::Other(code) => code,
        }
    }

    /// Returns true for the three matching variants.
    pub fn is_matching(self) -> bool {
        matches!(
            self,
            Self::MatchingColumns | Self::MatchingPairs | Self::MatchingValues
        )
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::SingleChoice => "Single Choice",
            Self::MultipleChoice => "Multiple Choice",
            Self::Ranking => "Ranking",
            Self::MatchingColumns => "Matching Columns",
            Self::MatchingPairs => "Matching Pairs",
            Self::MatchingValues => "Matching Values",
            Self::TextInput => "Text Input",
            Self::Other(_) => "Unknown",
        }
    }
}

impl From<QuestionType> for u32 {
    fn from(question_type: QuestionType) -> Self {
        question_type.code()
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Other(code) => write!(f, "Unknown ({})", code),
            known => f.write_str(known.display_name()),
        }
    }
}

/// One answer option.
///
/// Stored with a 0-based `index`. The source format numbers answers from 1
/// (`<a_1>`); that form is available through [`Answer::number`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// 0-based position
    pub index: usize,
    /// Display text
    pub text: String,
}

impl Answer {
    /// Creates an answer from its 0-based index.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Creates an answer from the 1-based number used by `<a_N>` tags.
    pub fn from_number(number: usize, text: impl Into<String>) -> Self {
        Self::new(number.saturating_sub(1), text)
    }

    /// Returns the 1-based number used by `<a_N>` tags.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

// Both external shapes: `id` (0-based) and `idx` (1-based)
impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Answer", 3)?;
        state.serialize_field("id", &self.index)?;
        state.serialize_field("idx", &self.number())?;
        state.serialize_field("text", &self.text)?;
        state.end()
    }
}

/// A parsed question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// ID from the enclosing numeric tag, as written
    pub id: String,
    /// Title from `<Q_TITLE>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Question type
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Question text, may contain `<img src='...'>` and `<br>` markup
    pub text: String,
    /// Image path from the embedded `<img>` marker, with forward slashes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Text from `<description>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Answers in source order; missing `<a_N>` tags are absent
    pub answers: Vec<Answer>,
    /// Sorted 0-based positions flagged `1` in `<value>`
    pub correct_answers: Vec<usize>,
    /// `n=`: number of announced answers
    pub answer_count: u32,
    /// `right=`: number of required correct answers
    pub right_count: u32,
    /// `max=`: point weight / attempts, defaults to 1
    pub max_attempts: u32,
    /// Derived score, see [`calculate_points`](crate::points::calculate_points)
    pub points: u32,
    /// True when the title is the soft-delete marker
    pub is_deleted: bool,
}

impl Question {
    /// Returns true if the answer at 0-based `index` is correct.
    pub fn is_correct(&self, index: usize) -> bool {
        self.correct_answers.binary_search(&index).is_ok()
    }

    /// Looks up an answer by its 1-based number.
    pub fn answer(&self, number: usize) -> Option<&Answer> {
        self.answers.iter().find(|answer| answer.number() == number)
    }

    /// Regenerates the `<value>` bitmap form over all announced answers.
    pub fn value_bitmap(&self) -> Vec<bool> {
        let len = (self.answer_count as usize).max(
            self.correct_answers
                .last()
                .map(|last| last + 1)
                .unwrap_or(0),
        );
        (0..len).map(|index| self.is_correct(index)).collect()
    }

    /// Regenerates the "first `right` answers are correct" form.
    pub fn leading_correct(&self) -> Vec<usize> {
        (0..self.right_count as usize).collect()
    }

    /// Returns true if the bitmap and the leading-`right` forms agree.
    pub fn uses_leading_convention(&self) -> bool {
        self.correct_answers == self.leading_correct()
    }

    /// Returns the correct answers under the bitmap convention.
    pub fn correct(&self) -> impl Iterator<Item = &Answer> {
        self.answers.iter().filter(|answer| self.is_correct(answer.index))
    }
}
