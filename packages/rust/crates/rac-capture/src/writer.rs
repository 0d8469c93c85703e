//! Archive file naming and writing.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use rac_types::{ArchivedDocument, DEFAULT_SUMMARY, DEFAULT_TITLE, DocumentRecord};
use regex::Regex;
use reqwest::Url;

use crate::analyzer::ContentAnalysis;
use crate::error::CaptureError;
use crate::extract::ExtractedPage;
use crate::fetch::netloc;

const MAX_PATH_CHARS: usize = 100;

/// Anything that is not a word character, `-` or `.`.
static RE_UNSAFE_FILE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\-.]").unwrap_or_else(|err| panic!("invalid RE_UNSAFE_FILE_CHARS regex: {err}"))
});

/// File name for a capture of `url` taken at `now`.
///
/// `{host}_{path}.md` with a leading `www.` dropped from the host and `/`
/// in the path turned into `_`; pages without a path use the capture time
/// instead. Characters other than word characters, `-` and `.` become `_`.
#[must_use]
pub fn archive_file_name(url: &str, now: NaiveDateTime) -> String {
    let (host, path) = match Url::parse(url.trim()) {
        Ok(parsed) => (netloc(&parsed), parsed.path().to_string()),
        Err(_) => (String::new(), url.trim().to_string()),
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let path: String = path
        .trim_matches('/')
        .replace('/', "_")
        .chars()
        .take(MAX_PATH_CHARS)
        .collect();

    let name = if path.is_empty() {
        format!("{host}_{}.md", now.format("%Y%m%d_%H%M%S"))
    } else {
        format!("{host}_{path}.md")
    };
    RE_UNSAFE_FILE_CHARS.replace_all(&name, "_").into_owned()
}

/// Writes captured documents into the archive directory.
pub struct ArchiveWriter {
    output_dir: PathBuf,
    category: String,
}

impl ArchiveWriter {
    /// Create a writer for `output_dir`; every record gets `category`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, category: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            category: category.into(),
        }
    }

    /// Archive directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Assemble the document for one capture.
    #[must_use]
    pub fn build_document(
        &self,
        url: &str,
        page: &ExtractedPage,
        analysis: &ContentAnalysis,
        now: NaiveDateTime,
    ) -> ArchivedDocument {
        let mut record = DocumentRecord::new(url, page.domain.as_str(), now);
        let title = page.title.trim();
        record.title = if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title.to_string()
        };
        record.date_published.clone_from(&page.publication_date);
        record.author.clone_from(&page.author);
        record.category.clone_from(&self.category);
        record.technologies.clone_from(&analysis.technologies);
        record.programming_languages.clone_from(&analysis.programming_languages);
        record.tags.clone_from(&analysis.tags);
        record.key_concepts.clone_from(&analysis.key_concepts);
        record.code_examples = analysis.code_examples;
        record.difficulty_level = analysis.difficulty_level;
        record.summary = analysis
            .summary
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());
        ArchivedDocument::new(record, analysis.content.as_str())
    }

    /// Write one capture and return the file path.
    ///
    /// A file of the same name is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the file cannot be written.
    pub fn write(
        &self,
        url: &str,
        page: &ExtractedPage,
        analysis: &ContentAnalysis,
        now: NaiveDateTime,
    ) -> Result<PathBuf, CaptureError> {
        let rendered = self.build_document(url, page, analysis, now).render()?;
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| CaptureError::io(&self.output_dir, e))?;

        let path = self.output_dir.join(archive_file_name(url, now));
        if path.exists() {
            tracing::warn!(
                event = "capture.writer.overwrite",
                path = %path.display(),
                url,
                "archive file exists; replacing with new capture"
            );
        }
        fs::write(&path, rendered).map_err(|e| CaptureError::io(&path, e))?;
        Ok(path)
    }
}
