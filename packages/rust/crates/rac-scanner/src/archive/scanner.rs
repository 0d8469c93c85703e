//! Archive Scanner - Reads captured documents with YAML front matter.
//!
//! # Example
//!
//! ```ignore
//! use rac_scanner::ArchiveScanner;
//!
//! let scanner = ArchiveScanner::new();
//! let entries = scanner.scan_all(Path::new("processed_documents"), None)?;
//!
//! for entry in entries {
//!     println!("{} - {}", entry.record.title, entry.record.source);
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::archive::types::{ArchiveEntry, ArchiveFilter, BodyStats};
use crate::error::ScanError;
use crate::frontmatter::parse_document;

/// Archive Scanner - Scans and indexes captured documents.
#[derive(Debug, Default)]
pub struct ArchiveScanner;

impl ArchiveScanner {
    /// Create a new archive scanner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scan a single archive document.
    ///
    /// # Errors
    ///
    /// Returns an error for non-markdown paths, unreadable files and files
    /// without a valid Document Record.
    pub fn scan_document(&self, path: &Path, base_path: &Path) -> Result<ArchiveEntry, ScanError> {
        if !is_markdown(path) {
            return Err(ScanError::NotMarkdown(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        let relative_path = path.strip_prefix(base_path).unwrap_or(path);
        let file_path = relative_path.to_string_lossy().replace('\\', "/");

        let document = parse_document(&content)?;
        let stats = BodyStats::from_markdown(&document.body);

        Ok(ArchiveEntry {
            id: path_id(&file_path),
            file_path,
            file_hash: content_hash(&content),
            record: document.record,
            stats,
        })
    }

    /// Scan an archive directory with parallel processing.
    ///
    /// Files that fail to parse are skipped with a warning; use
    /// [`ArchiveScanner::lint`] to report them.
    ///
    /// # Arguments
    ///
    /// * `base_path` - Archive root
    /// * `depth` - Maximum subdirectory depth (`None` for unlimited, `Some(0)`
    ///   for the root only)
    ///
    /// # Errors
    ///
    /// Returns an error if `base_path` exists but is not a directory.
    pub fn scan_all(
        &self,
        base_path: &Path,
        depth: Option<usize>,
    ) -> Result<Vec<ArchiveEntry>, ScanError> {
        let md_files = markdown_files(base_path, depth)?;

        let mut entries: Vec<ArchiveEntry> = md_files
            .par_iter()
            .filter_map(|path| match self.scan_document(path, base_path) {
                Ok(entry) => Some(entry),
                Err(error) => {
                    log::warn!("Skipping {}: {error}", path.display());
                    None
                }
            })
            .collect();
        entries.sort_by(|a, b| a.file_path.cmp(&b.file_path));

        log::info!(
            "Scanned {} archive documents from {}",
            entries.len(),
            base_path.display()
        );

        Ok(entries)
    }

    /// Scan and keep entries matching `filter`.
    ///
    /// # Errors
    ///
    /// See [`ArchiveScanner::scan_all`].
    pub fn filter(
        &self,
        base_path: &Path,
        filter: &ArchiveFilter,
    ) -> Result<Vec<ArchiveEntry>, ScanError> {
        let entries = self.scan_all(base_path, None)?;
        if filter.is_empty() {
            return Ok(entries);
        }
        Ok(entries
            .into_iter()
            .filter(|e| filter.matches(&e.record))
            .collect())
    }

    /// All tags with their document counts, most frequent first.
    ///
    /// # Errors
    ///
    /// See [`ArchiveScanner::scan_all`].
    pub fn tag_counts(&self, base_path: &Path) -> Result<Vec<(String, usize)>, ScanError> {
        let entries = self.scan_all(base_path, None)?;
        Ok(count_values(&entries, |e| &e.record.tags))
    }

    /// All technologies with their document counts, most frequent first.
    ///
    /// # Errors
    ///
    /// See [`ArchiveScanner::scan_all`].
    pub fn technology_counts(&self, base_path: &Path) -> Result<Vec<(String, usize)>, ScanError> {
        let entries = self.scan_all(base_path, None)?;
        Ok(count_values(&entries, |e| &e.record.technologies))
    }
}

/// Count values case-insensitively, reporting the first spelling seen.
///
/// Sorted by count descending, then name ascending.
pub fn count_values<F>(entries: &[ArchiveEntry], values: F) -> Vec<(String, usize)>
where
    F: Fn(&ArchiveEntry) -> &Vec<String>,
{
    let mut counts: HashMap<String, (String, usize)> = HashMap::new();
    for entry in entries {
        for value in values(entry) {
            counts
                .entry(value.to_lowercase())
                .or_insert_with(|| (value.clone(), 0))
                .1 += 1;
        }
    }

    let mut counted: Vec<(String, usize)> = counts.into_values().collect();
    counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counted
}

/// Collect markdown files under `base_path`, skipping hidden entries.
pub(crate) fn markdown_files(
    base_path: &Path,
    depth: Option<usize>,
) -> Result<Vec<PathBuf>, ScanError> {
    if !base_path.exists() {
        log::warn!("Archive directory not found: {}", base_path.display());
        return Ok(Vec::new());
    }
    if !base_path.is_dir() {
        return Err(ScanError::NotADirectory(base_path.to_path_buf()));
    }

    let walker = WalkDir::new(base_path)
        .follow_links(false)
        .max_depth(depth.map_or(usize::MAX, |d| d + 1));

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

fn path_id(relative_path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(relative_path.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}
