//! YAML front matter parsing for archive documents.
//!
//! A document opens with a line containing only `---` (blank lines and a
//! UTF-8 BOM before it are tolerated) and the block closes at the next line
//! containing only `---` or `...`. Horizontal rules later in the body are
//! never mistaken for delimiters.

use std::fs;
use std::path::Path;

use rac_types::{ArchivedDocument, DocumentRecord};

use crate::error::ScanError;

/// Borrowed view of a document split at its front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// YAML between the delimiters, without them
    pub yaml: &'a str,
    /// Everything after the closing delimiter line
    pub body: &'a str,
}

/// Split `content` into front matter and body.
///
/// # Errors
///
/// Returns [`ScanError::MissingFrontMatter`] when the first non-blank line
/// is not `---`, and [`ScanError::UnterminatedFrontMatter`] when no closing
/// delimiter follows.
pub fn split_frontmatter(content: &str) -> Result<FrontMatter<'_>, ScanError> {
    let text = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = text.split_inclusive('\n');
    let mut offset = 0;

    loop {
        let Some(line) = lines.next() else {
            return Err(ScanError::MissingFrontMatter);
        };
        offset += line.len();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "---" {
            break;
        }
        return Err(ScanError::MissingFrontMatter);
    }

    let yaml_start = offset;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Ok(FrontMatter {
                yaml: &text[yaml_start..offset],
                body: &text[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(ScanError::UnterminatedFrontMatter)
}

/// Extract front matter from markdown content.
///
/// Returns `None` when the content has no complete front matter block.
#[must_use]
pub fn extract_frontmatter(content: &str) -> Option<FrontMatter<'_>> {
    split_frontmatter(content).ok()
}

/// Parse YAML front matter content into a serde value.
///
/// # Errors
///
/// Returns an error if the YAML is invalid.
pub fn parse_frontmatter(yaml_content: &str) -> Result<serde_yaml::Value, serde_yaml::Error> {
    serde_yaml::from_str(yaml_content)
}

/// Parse a complete archive document.
///
/// The `# {title}` heading written at capture time is removed from the body
/// so that re-rendering the result reproduces the file.
///
/// # Errors
///
/// Returns an error if the front matter is missing, unterminated or not a
/// valid Document Record.
pub fn parse_document(content: &str) -> Result<ArchivedDocument, ScanError> {
    let front = split_frontmatter(content)?;
    let record: DocumentRecord = serde_yaml::from_str(front.yaml)?;
    let body = strip_title_heading(front.body, &record.title);
    Ok(ArchivedDocument::new(record, body.trim_end()))
}

/// Read and parse an archive document from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_document(path: &Path) -> Result<ArchivedDocument, ScanError> {
    let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
    parse_document(&content)
}

fn strip_title_heading<'a>(body: &'a str, title: &str) -> &'a str {
    let body = body.trim_start_matches(['\n', '\r']);
    let heading = format!("# {}", title.trim());
    match body.strip_prefix(heading.as_str()) {
        Some(rest) if rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n") => {
            rest.trim_start_matches(['\n', '\r'])
        }
        _ => body,
    }
}
