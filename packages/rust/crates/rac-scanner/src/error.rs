//! Error types for archive scanning.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading archive documents.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The document does not begin with a `---` line.
    #[error("Missing front matter")]
    MissingFrontMatter,

    /// The opening `---` has no closing delimiter.
    #[error("Unterminated front matter")]
    UnterminatedFrontMatter,

    /// The front matter is not a valid Document Record.
    #[error("Invalid front matter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Only `*.md` files are archive documents.
    #[error("Not a markdown document: {0}")]
    NotMarkdown(PathBuf),

    /// The archive root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Low-level read failure.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Attach a path to an I/O error.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
