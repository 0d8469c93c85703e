//! A captured article as stored on disk: front matter plus Markdown body.

use serde::{Deserialize, Serialize};

use crate::error::RecordResult;
use crate::record::DocumentRecord;

/// One archive file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedDocument {
    /// Front matter metadata
    pub record: DocumentRecord,
    /// Markdown content following the front matter
    pub body: String,
}

impl ArchivedDocument {
    /// Create a document from a record and its Markdown body.
    #[must_use]
    pub fn new(record: DocumentRecord, body: impl Into<String>) -> Self {
        Self {
            record,
            body: body.into(),
        }
    }

    /// Render the full file: front matter, a level-one heading with the
    /// record title, then the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the front matter cannot be serialized.
    pub fn render(&self) -> RecordResult<String> {
        let front_matter = self.record.to_front_matter()?;
        let body = self.body.trim_matches('\n');
        Ok(format!(
            "{front_matter}\n# {}\n\n{body}\n",
            self.record.title.trim()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_render_layout() {
        let captured = NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut record = DocumentRecord::new("https://example.com/cqrs", "example.com", captured);
        record.title = "CQRS Explained".into();
        let doc = ArchivedDocument::new(record, "\n\nCommands and queries.\n\n");

        let rendered = doc.render().unwrap();
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.contains("---\n\n# CQRS Explained\n\nCommands and queries.\n"));
        assert!(rendered.ends_with("Commands and queries.\n"));
    }
}
