//! Category outline and question groups.

use serde::Serialize;

/// A category from the outline section.
///
/// Question IDs are lookup-only references into
/// [`TestData::questions`](super::TestData::questions).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category name
    pub title: String,
    /// IDs of questions listed directly under this category
    pub question_ids: Vec<String>,
    /// Nested categories
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<Category>,
    /// Indentation depth (0 for top-level)
    pub level: usize,
}

impl Category {
    /// Creates an empty category at the given depth.
    pub fn new(title: impl Into<String>, level: usize) -> Self {
        Self {
            title: title.into(),
            question_ids: Vec::new(),
            subcategories: Vec::new(),
            level,
        }
    }

    /// Returns all question IDs in this category and its subcategories,
    /// depth-first.
    pub fn all_question_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.question_ids.iter().map(String::as_str).collect();
        for sub in &self.subcategories {
            ids.extend(sub.all_question_ids());
        }
        ids
    }

    /// Returns this category and every nested one, depth-first.
    pub fn flatten(&self) -> Vec<&Category> {
        let mut all = vec![self];
        for sub in &self.subcategories {
            all.extend(sub.flatten());
        }
        all
    }
}

/// A question group from the `gr-id` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group ID as written (e.g. "0")
    pub id: String,
    /// Question IDs per source tag
    pub question_ids: GroupBuckets,
}

/// The three question-ID buckets of a [`Group`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupBuckets {
    /// IDs from `<tv_i>`
    pub tv_i: Vec<String>,
    /// IDs from `<tv_p>`
    pub tv_p: Vec<String>,
    /// IDs from `<tv_d>`
    pub tv_d: Vec<String>,
}

impl GroupBuckets {
    /// Returns true if all buckets are empty.
    pub fn is_empty(&self) -> bool {
        self.tv_i.is_empty() && self.tv_p.is_empty() && self.tv_d.is_empty()
    }
}
