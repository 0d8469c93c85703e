//! rac-scanner - Reads the capture archive back.
//!
//! # Architecture
//!
//! ```text
//! rac-scanner/src/
//! ├── lib.rs              # Main module and exports
//! ├── error.rs            # ScanError
//! ├── frontmatter.rs      # YAML front matter splitting and document parsing
//! └── archive/
//!     ├── mod.rs
//!     ├── scanner.rs      # ArchiveScanner: scan, filter, tag counts
//!     ├── lint.rs         # Structural and consistency checks
//!     └── types.rs        # ArchiveEntry, ArchiveFilter, BodyStats
//! ```
//!
//! # YAML Front Matter
//!
//! ```yaml
//! ---
//! title: Database per Service
//! source: https://example.com/patterns/database-per-service
//! date_captured: 2025-01-14T10:21:07.512044
//! domain: example.com
//! tags: [microservices, data-management]
//! ---
//! ```

pub mod archive;
pub mod error;
pub mod frontmatter;

pub use archive::{
    lint::{LintIssue, LintIssueKind, LintReport, LintSeverity, REQUIRED_FIELDS, lint_content},
    scanner::{ArchiveScanner, count_values},
    types::{ArchiveEntry, ArchiveFilter, BodyStats},
};
pub use error::ScanError;
pub use frontmatter::{
    FrontMatter, extract_frontmatter, parse_document, parse_frontmatter, read_document,
    split_frontmatter,
};
pub use rac_types::source_host;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
