//! Document Record: the YAML front matter carried by every archived article.
//!
//! ```yaml
//! ---
//! title: Understanding the Saga Pattern
//! source: https://example.com/blog/saga-pattern
//! date_published: 2024-03-02T08:00:00Z
//! date_captured: 2025-01-14T10:21:07.512044
//! domain: example.com
//! author: Jane Doe
//! category: programming
//! technologies: [Kafka, ASP.NET Core]
//! programming_languages: [C#]
//! tags: [microservices, saga]
//! key_concepts: [distributed-transactions]
//! code_examples: true
//! difficulty_level: intermediate
//! summary: |
//!   Explains orchestration and choreography based sagas.
//! ---
//! ```
//!
//! Reading is lenient so that older captures (Python-style `True`, bare
//! scalars in lists, `date_published: unknown`) still load.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::difficulty::DifficultyLevel;
use crate::error::RecordResult;

/// Title used when a page has none.
pub const DEFAULT_TITLE: &str = "Untitled";
/// Author used when a page names none.
pub const DEFAULT_AUTHOR: &str = "Unknown";
/// Category assigned to captures unless configured otherwise.
pub const DEFAULT_CATEGORY: &str = "programming";
/// Summary used when the analyzer produced none.
pub const DEFAULT_SUMMARY: &str = "No summary available";
/// On-disk marker for an unknown publication date.
pub const UNKNOWN_DATE: &str = "unknown";
/// Format of `date_captured`.
pub const CAPTURED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Metadata describing one captured article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentRecord {
    /// Page title
    #[serde(default = "default_title", deserialize_with = "text")]
    pub title: String,
    /// URL the article was captured from
    pub source: String,
    /// Publication date as found on the page (`unknown` when absent)
    #[serde(default, with = "published")]
    #[schemars(with = "String")]
    pub date_published: Option<String>,
    /// Local time of capture
    #[serde(with = "captured")]
    #[schemars(with = "String")]
    pub date_captured: NaiveDateTime,
    /// Host (and explicit port) of the source URL
    #[serde(default, deserialize_with = "text")]
    pub domain: String,
    /// Author name
    #[serde(default = "default_author", deserialize_with = "text")]
    pub author: String,
    /// Archive category
    #[serde(default = "default_category", deserialize_with = "text")]
    pub category: String,
    /// Technologies, frameworks, libraries and tools mentioned
    #[serde(default, deserialize_with = "string_list")]
    pub technologies: Vec<String>,
    /// Programming languages only
    #[serde(default, deserialize_with = "string_list")]
    pub programming_languages: Vec<String>,
    /// Lowercase hyphenated categorization terms
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    /// Main concepts, patterns or methodologies
    #[serde(default, deserialize_with = "string_list")]
    pub key_concepts: Vec<String>,
    /// Whether the article contains code
    #[serde(default, deserialize_with = "lenient_bool")]
    pub code_examples: bool,
    /// Reader difficulty
    #[serde(default)]
    pub difficulty_level: DifficultyLevel,
    /// Short prose summary
    #[serde(default = "default_summary", deserialize_with = "summary_text")]
    pub summary: String,
}

impl DocumentRecord {
    /// Create a record for `source` with every optional field at its default.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        domain: impl Into<String>,
        date_captured: NaiveDateTime,
    ) -> Self {
        Self {
            title: default_title(),
            source: source.into(),
            date_published: None,
            date_captured,
            domain: domain.into(),
            author: default_author(),
            category: default_category(),
            technologies: Vec::new(),
            programming_languages: Vec::new(),
            tags: Vec::new(),
            key_concepts: Vec::new(),
            code_examples: false,
            difficulty_level: DifficultyLevel::Unknown,
            summary: default_summary(),
        }
    }

    /// Publication date, if the page declared one.
    #[must_use]
    pub fn published(&self) -> Option<&str> {
        self.date_published.as_deref()
    }

    /// Render as a `---` delimited YAML block, including the trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn to_front_matter(&self) -> RecordResult<String> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("---\n{yaml}---\n"))
    }

    /// Case-insensitive membership test against `tags`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Case-insensitive membership test against `technologies`.
    #[must_use]
    pub fn uses_technology(&self, technology: &str) -> bool {
        self.technologies
            .iter()
            .any(|t| t.eq_ignore_ascii_case(technology))
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_summary() -> String {
    DEFAULT_SUMMARY.to_string()
}

/// Scalar accepted where text is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Bool(bool),
    Number(serde_yaml::Number),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
        }
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(Scalar::into_text).unwrap_or_default())
}

fn summary_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    text(deserializer).map(|s| s.trim_end().to_string())
}

fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = Option::<Vec<Option<Scalar>>>::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .map(|item| item.into_text().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Bool(b)) => b,
        Some(Scalar::Text(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        ),
        Some(Scalar::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        None => false,
    })
}

mod published {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Scalar, UNKNOWN_DATE};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(UNKNOWN_DATE))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Option::<Scalar>::deserialize(deserializer)?;
        Ok(value
            .map(|v| v.into_text().trim().to_string())
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(UNKNOWN_DATE)))
    }
}

mod captured {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::CAPTURED_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(CAPTURED_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim())
            .ok_or_else(|| D::Error::custom(format!("invalid date_captured timestamp: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.naive_local())
            })
    }
}

/// Parse a `date_captured` value in any of the accepted layouts.
#[must_use]
pub fn parse_captured(raw: &str) -> Option<NaiveDateTime> {
    captured::parse(raw.trim())
}
