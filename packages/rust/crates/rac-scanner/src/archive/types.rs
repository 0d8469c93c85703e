//! Archive Types
//!
//! Entries produced by scanning, body statistics, and the filter used to
//! select documents.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use rac_types::{DifficultyLevel, DocumentRecord};
use serde::{Deserialize, Serialize};

/// Facts about a document body, computed from its Markdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BodyStats {
    /// Whitespace-separated words in text and inline code
    pub word_count: usize,
    /// Fenced or indented code blocks
    pub code_block_count: usize,
    /// Text of the first heading, if any
    pub first_heading: Option<String>,
}

impl BodyStats {
    /// Compute statistics for a Markdown body.
    #[must_use]
    pub fn from_markdown(markdown: &str) -> Self {
        let mut stats = Self::default();
        let mut heading: Option<String> = None;

        for event in Parser::new(markdown) {
            match event {
                Event::Start(Tag::CodeBlock(_)) => stats.code_block_count += 1,
                Event::Start(Tag::Heading { .. }) if stats.first_heading.is_none() => {
                    heading = Some(String::new());
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(text) = heading.take() {
                        stats.first_heading = Some(text.trim().to_string());
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    stats.word_count += text.split_whitespace().count();
                    if let Some(h) = heading.as_mut() {
                        h.push_str(&text);
                    }
                }
                _ => {}
            }
        }

        stats
    }
}

/// One scanned archive document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    /// Stable identifier derived from the relative path
    pub id: String,
    /// Path relative to the archive root
    pub file_path: String,
    /// SHA256 hash of file content for change detection
    pub file_hash: String,
    /// Parsed front matter
    pub record: DocumentRecord,
    /// Body statistics
    #[serde(flatten)]
    pub stats: BodyStats,
}

/// Criteria for selecting archive entries.
///
/// Every populated criterion must match; within `tags` and `technologies`
/// any single value is enough. Comparisons ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveFilter {
    /// Entries carrying any of these tags
    pub tags: Vec<String>,
    /// Entries using any of these technologies
    pub technologies: Vec<String>,
    /// Entries at exactly this difficulty
    pub difficulty: Option<DifficultyLevel>,
    /// Entries captured from this domain (a leading `www.` is ignored)
    pub domain: Option<String>,
}

impl ArchiveFilter {
    /// Create an empty filter that matches everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add a technology.
    #[must_use]
    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technologies.push(technology.into());
        self
    }

    /// Restrict to a difficulty.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: DifficultyLevel) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Restrict to a domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Whether no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.technologies.is_empty()
            && self.difficulty.is_none()
            && self.domain.is_none()
    }

    /// Test a record against the filter.
    #[must_use]
    pub fn matches(&self, record: &DocumentRecord) -> bool {
        if !self.tags.is_empty() && !self.tags.iter().any(|t| record.has_tag(t)) {
            return false;
        }
        if !self.technologies.is_empty()
            && !self.technologies.iter().any(|t| record.uses_technology(t))
        {
            return false;
        }
        if let Some(difficulty) = self.difficulty
            && record.difficulty_level != difficulty
        {
            return false;
        }
        if let Some(domain) = &self.domain
            && !strip_www(&record.domain).eq_ignore_ascii_case(strip_www(domain))
        {
            return false;
        }
        true
    }
}

fn strip_www(domain: &str) -> &str {
    domain.strip_prefix("www.").unwrap_or(domain)
}
