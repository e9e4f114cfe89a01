//! `Key=Value` metadata section.

use crate::dialect::MetadataKeys;
use crate::tags::key_values;

/// Values read from the metadata section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Test title
    pub title: Option<String>,
    /// Authors
    pub author: Option<String>,
    /// Copyright line
    pub copyright: Option<String>,
    /// Date
    pub date: Option<String>,
}

/// Parses the metadata section using the given literal keys.
///
/// Keys and values are trimmed. The first occurrence of a key wins and an
/// empty value counts as absent. Unknown keys are ignored.
pub fn parse_metadata(text: &str, keys: &MetadataKeys) -> Metadata {
    let mut metadata = Metadata::default();

    for (key, value) in key_values(text) {
        let slot = if key == keys.title {
            &mut metadata.title
        } else if key == keys.authors {
            &mut metadata.author
        } else if key == keys.copyright {
            &mut metadata.copyright
        } else if key == keys.date {
            &mut metadata.date
        } else {
            continue;
        };

        if slot.is_none() && !value.is_empty() {
            *slot = Some(value.to_string());
        }
    }

    metadata
}
