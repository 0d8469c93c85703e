//! rac-types - Document Record types for the article archive.
//!
//! Every archived article is a Markdown file whose leading YAML block is a
//! [`DocumentRecord`]. This crate owns that record, its rendering, and the
//! JSON Schema describing it.
//!
//! ```text
//! rac-types/src/
//! ├── lib.rs          # Exports and schema generation
//! ├── difficulty.rs   # DifficultyLevel
//! ├── document.rs     # ArchivedDocument (record + body)
//! ├── error.rs        # RecordError
//! ├── record.rs       # DocumentRecord and its lenient serde helpers
//! └── source.rs       # Source URL parsing and `domain` normalization
//! ```

pub mod difficulty;
pub mod document;
pub mod error;
pub mod record;
pub mod source;

pub use difficulty::DifficultyLevel;
pub use document::ArchivedDocument;
pub use error::{RecordError, RecordResult};
pub use record::{
    CAPTURED_FORMAT, DEFAULT_AUTHOR, DEFAULT_CATEGORY, DEFAULT_SUMMARY, DEFAULT_TITLE,
    DocumentRecord, UNKNOWN_DATE, parse_captured,
};
pub use source::{domain_matches, netloc, parse_source_url, source_host};

/// Generate JSON Schema for `DocumentRecord`.
#[must_use]
pub fn record_schema() -> String {
    let schema = schemars::schema_for!(DocumentRecord);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
