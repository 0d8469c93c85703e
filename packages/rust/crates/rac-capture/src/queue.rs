//! URL queue file and processed log.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rac_types::{CAPTURED_FORMAT, parse_captured};

use crate::error::CaptureError;

/// Queue of URLs still to capture, one per line.
///
/// Blank lines are ignored and lines starting with `#` are comments.
#[derive(Debug, Clone)]
pub struct LinkQueue {
    path: PathBuf,
}

impl LinkQueue {
    /// Queue backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Queue file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pending URLs in file order.
    ///
    /// A missing file is logged and reads as an empty queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn read(&self) -> Result<Vec<String>, CaptureError> {
        let Some(content) = self.read_raw()? else {
            tracing::error!(path = %self.path.display(), "Source file not found");
            return Ok(Vec::new());
        };
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(ToString::to_string)
            .collect())
    }

    /// Drop every line equal to `url`, keeping comments and other URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or rewritten.
    pub fn remove(&self, url: &str) -> Result<(), CaptureError> {
        let Some(content) = self.read_raw()? else {
            return Ok(());
        };
        let url = url.trim();
        let mut kept = String::with_capacity(content.len());
        for line in content.lines().map(str::trim) {
            if line.is_empty() || line == url {
                continue;
            }
            kept.push_str(line);
            kept.push('\n');
        }
        fs::write(&self.path, kept).map_err(|e| CaptureError::io(&self.path, e))?;
        tracing::info!("Removed {url} from source file");
        Ok(())
    }

    fn read_raw(&self) -> Result<Option<String>, CaptureError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(CaptureError::io(&self.path, error)),
        }
    }
}

/// One completed capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEntry {
    /// When the capture finished
    pub captured_at: NaiveDateTime,
    /// Captured URL
    pub url: String,
    /// Archive file written
    pub output_path: PathBuf,
}

/// Append-only log of completed captures: `timestamp\turl\tpath` lines.
#[derive(Debug, Clone)]
pub struct ProcessedLog {
    path: PathBuf,
}

impl ProcessedLog {
    /// Log backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Record a completed capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be opened or written.
    pub fn append(
        &self,
        url: &str,
        output_path: &Path,
        now: NaiveDateTime,
    ) -> Result<(), CaptureError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CaptureError::io(&self.path, e))?;
        writeln!(
            file,
            "{}\t{url}\t{}",
            now.format(CAPTURED_FORMAT),
            output_path.display()
        )
        .map_err(|e| CaptureError::io(&self.path, e))
    }

    /// All recorded captures; malformed lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the log exists but cannot be read.
    pub fn entries(&self) -> Result<Vec<ProcessedEntry>, CaptureError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(CaptureError::io(&self.path, error)),
        };
        Ok(content.lines().filter_map(parse_entry).collect())
    }
}

fn parse_entry(line: &str) -> Option<ProcessedEntry> {
    let mut fields = line.splitn(3, '\t');
    let captured_at = parse_captured(fields.next()?.trim())?;
    let url = fields.next()?.trim();
    let output_path = fields.next()?.trim();
    if url.is_empty() || output_path.is_empty() {
        return None;
    }
    Some(ProcessedEntry {
        captured_at,
        url: url.to_string(),
        output_path: PathBuf::from(output_path),
    })
}
