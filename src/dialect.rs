//! Tag vocabulary of the source format.
//!
//! All tag names and metadata keys the parser looks for live here, so that a
//! variant of the format is described by a different [`Dialect`] value rather
//! than a second parser.

/// Literal keys of the `Key=Value` metadata section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataKeys {
    /// Test title key
    pub title: String,
    /// Authors key
    pub authors: String,
    /// Copyright key
    pub copyright: String,
    /// Date key
    pub date: String,
}

impl Default for MetadataKeys {
    fn default() -> Self {
        Self {
            title: "Название".to_string(),
            authors: "Авторы".to_string(),
            copyright: "Копирайт".to_string(),
            date: "Дата".to_string(),
        }
    }
}

/// Declared tag vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// Section holding the numbered question blocks (required)
    pub body_tag: String,
    /// Test ID section
    pub id_tag: String,
    /// Title section, used when the metadata has no title
    pub title_tag: String,
    /// Indented category outline
    pub outline_tag: Option<String>,
    /// `Key=Value` metadata section
    pub metadata_tag: Option<String>,
    /// Introduction text section
    pub intro_tag: Option<String>,
    /// Group section with numbered group blocks
    pub group_tag: Option<String>,
    /// Sub-tags of a group block, in bucket order
    pub group_buckets: [String; 3],
    /// Sections whose purely numeric content is kept verbatim
    pub numeric_tags: Vec<String>,
    /// Top-level sections re-emitted before the body in plain-text output
    pub header_tags: Vec<String>,
    /// Metadata keys
    pub metadata_keys: MetadataKeys,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::standard()
    }
}

impl Dialect {
    /// The `.fdb` / `.et1` vocabulary.
    pub fn standard() -> Self {
        Self {
            body_tag: "T_body".to_string(),
            id_tag: "T_id".to_string(),
            title_tag: "T_title".to_string(),
            outline_tag: Some("tv_i".to_string()),
            metadata_tag: Some("info-id".to_string()),
            intro_tag: Some("intro-id".to_string()),
            group_tag: Some("gr-id".to_string()),
            group_buckets: ["tv_i".to_string(), "tv_p".to_string(), "tv_d".to_string()],
            numeric_tags: strings(&["T_id", "tv_p", "tv_d"]),
            header_tags: strings(&[
                "T_head", "T_id", "T_title", "tv_i", "tv_p", "tv_d", "info-id", "intro-id",
            ]),
            metadata_keys: MetadataKeys::default(),
        }
    }

    /// A dialect with only the body section; every optional section is off.
    pub fn body_only() -> Self {
        Self {
            outline_tag: None,
            metadata_tag: None,
            intro_tag: None,
            group_tag: None,
            ..Self::standard()
        }
    }

    /// Sets the metadata keys.
    pub fn with_metadata_keys(mut self, keys: MetadataKeys) -> Self {
        self.metadata_keys = keys;
        self
    }

    /// Sets the body section name.
    pub fn with_body_tag(mut self, tag: impl Into<String>) -> Self {
        self.body_tag = tag.into();
        self
    }

    /// Disables group parsing.
    pub fn without_groups(mut self) -> Self {
        self.group_tag = None;
        self
    }

    /// Returns true if `tag` keeps purely numeric content verbatim.
    pub fn is_numeric_tag(&self, tag: &str) -> bool {
        self.numeric_tags.iter().any(|t| t == tag)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_vocabulary() {
        let dialect = Dialect::standard();
        assert_eq!(dialect.body_tag, "T_body");
        assert!(dialect.is_numeric_tag("T_id"));
        assert!(!dialect.is_numeric_tag("T_title"));
        assert_eq!(dialect.metadata_keys.title, "Название");
    }

    #[test]
    fn test_body_only() {
        let dialect = Dialect::body_only();
        assert!(dialect.outline_tag.is_none());
        assert!(dialect.group_tag.is_none());
        assert_eq!(dialect.body_tag, "T_body");
    }

    #[test]
    fn test_custom_keys() {
        let keys = MetadataKeys {
            title: "Title".into(),
            authors: "Authors".into(),
            copyright: "Copyright".into(),
            date: "Date".into(),
        };
        let dialect = Dialect::standard().with_metadata_keys(keys).without_groups();
        assert_eq!(dialect.metadata_keys.authors, "Authors");
        assert!(dialect.group_tag.is_none());
    }
}
