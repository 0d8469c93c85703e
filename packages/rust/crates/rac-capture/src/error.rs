//! Error types for the capture pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Page download failures.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL does not parse or is not http(s).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with something other than 200.
    #[error("HTTP {status} for URL: {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// Connection, timeout or body read failure.
    #[error("Error fetching {url}: {source}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Whether another attempt may succeed.
    ///
    /// Transport failures, server errors and rate limiting are retried;
    /// other statuses are final.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidUrl(_) => false,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Transport { .. } => true,
        }
    }
}

/// LLM analyzer failures. Any of these stops a capture run.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The request could not be sent or the body could not be read.
    #[error("{provider} API request failed: {source}")]
    Request {
        /// Analyzer backend name
        provider: &'static str,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status (quota, auth, outage).
    #[error("{provider} API error {status}: {body}")]
    Status {
        /// Analyzer backend name
        provider: &'static str,
        /// Response status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The response body is not the expected JSON.
    #[error("{provider} response parse error: {message}")]
    Decode {
        /// Analyzer backend name
        provider: &'static str,
        /// Decoder message
        message: String,
    },

    /// The response carried no text.
    #[error("{provider} response has no content")]
    EmptyResponse {
        /// Analyzer backend name
        provider: &'static str,
    },
}

/// Configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The selected analyzer needs a key and none was configured.
    #[error("{provider} API key not found (set {env} or analyzer.api_key)")]
    MissingApiKey {
        /// Analyzer backend name
        provider: &'static str,
        /// Environment variable that supplies the key
        env: &'static str,
    },

    /// `analyzer.provider` names no known backend.
    #[error("Unknown analyzer provider: {0}")]
    UnknownProvider(String),

    /// The chat completions backend needs an endpoint.
    #[error("analyzer.inference_url is required for the chat provider")]
    MissingInferenceUrl,

    /// The log file cannot be opened.
    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        /// Log file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Failure to capture one URL.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Download failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Analysis failed.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    /// Front matter could not be rendered.
    #[error(transparent)]
    Record(#[from] rac_types::RecordError),

    /// Queue, log or archive file access failed.
    #[error("Failed to access {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl CaptureError {
    /// Attach a path to an I/O error.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the run must stop instead of moving to the next URL.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Analyzer(_))
    }
}
