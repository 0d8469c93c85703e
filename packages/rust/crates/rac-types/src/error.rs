//! Error types for Document Record rendering.

use thiserror::Error;

/// Result alias for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Failures while turning a record into front matter.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The record could not be serialized as YAML.
    #[error("Front matter serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
