//! Top-level parsed test.

use super::{Category, Group, Question};
use serde::Serialize;

/// Title used when the source names none.
pub const UNTITLED: &str = "Untitled Test";

/// A complete parsed test.
///
/// Built in one parsing pass and read-only afterwards; re-parsing produces a
/// fresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestData {
    /// Test title
    pub title: String,
    /// Authors line from the metadata section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Copyright line from the metadata section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    /// Date line from the metadata section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Verbatim content of the test ID tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Introduction text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    /// Questions in document order
    pub questions: Vec<Question>,
    /// Category outline
    pub categories: Vec<Category>,
    /// Question groups, absent when the document has no group section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
}

impl Default for TestData {
    fn default() -> Self {
        Self {
            title: UNTITLED.to_string(),
            author: None,
            copyright: None,
            date: None,
            source_id: None,
            intro: None,
            questions: Vec::new(),
            categories: Vec::new(),
            groups: None,
        }
    }
}

impl TestData {
    /// Creates an empty test with the placeholder title.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a question by ID.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Sum of derived points over all questions.
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    /// Returns the test as pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the test as compact JSON.
    pub fn to_json_compact(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Checks structural completeness and returns one message per problem.
    ///
    /// Only shape is checked, not whether the content makes sense.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Missing test title".to_string());
        }

        for (position, question) in self.questions.iter().enumerate() {
            let name = if question.id.is_empty() {
                position.to_string()
            } else {
                question.id.clone()
            };

            if question.id.is_empty() {
                errors.push(format!("Question at index {} is missing an id", position));
            }
            if question.text.trim().is_empty() {
                errors.push(format!("Question {} is missing text", name));
            }
            if question.answers.is_empty() {
                errors.push(format!("Question {} has an empty answers array", name));
            }
        }

        for category in self.categories.iter().flat_map(|c| c.flatten()) {
            if category.title.trim().is_empty() {
                errors.push(format!(
                    "Category at level {} is missing a title",
                    category.level
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, QuestionType};

    fn question(id: &str, answers: Vec<Answer>) -> Question {
        Question {
            id: id.to_string(),
            title: None,
            question_type: QuestionType::SingleChoice,
            text: "text".to_string(),
            image: None,
            description: None,
            answers,
            correct_answers: vec![0],
            answer_count: 1,
            right_count: 1,
            max_attempts: 1,
            points: 1,
            is_deleted: false,
        }
    }

    #[test]
    fn test_default_title() {
        let test = TestData::new();
        assert_eq!(test.title, "Untitled Test");
        assert!(test.groups.is_none());
    }

    #[test]
    fn test_lookup_and_points() {
        let mut test = TestData::new();
        test.questions.push(question("4", vec![Answer::new(0, "x")]));
        test.questions.push(question("9", vec![Answer::new(0, "y")]));
        assert_eq!(test.question("9").map(|q| q.id.as_str()), Some("9"));
        assert_eq!(test.total_points(), 2);
    }

    #[test]
    fn test_validate_reports_empty_answers() {
        let mut test = TestData::new();
        test.questions.push(question("3", Vec::new()));
        let errors = test.validate();
        assert_eq!(errors, vec!["Question 3 has an empty answers array"]);
    }

    #[test]
    fn test_json_omits_absent_fields() {
        let json: serde_json::Value =
            serde_json::from_str(&TestData::new().to_json().unwrap()).unwrap();
        assert_eq!(json["title"], "Untitled Test");
        assert!(json.get("author").is_none());
        assert!(json.get("groups").is_none());
    }
}
