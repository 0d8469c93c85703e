//! Config namespace: layered YAML/env settings and the resolved capture config.

mod settings;

use std::path::PathBuf;
use std::time::Duration;

pub use settings::{
    AnalyzerSettings, CaptureSettings, LoggingSettings, RuntimeSettings, load_runtime_settings,
    load_runtime_settings_from_paths, read_dotenv, runtime_settings_paths,
};

use crate::error::ConfigError;

/// Default seconds to wait between URLs.
pub const DEFAULT_DELAY_SECS: u64 = 5;
/// Default extra fetch attempts after a retryable failure.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default linear back-off step between fetch attempts.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1_000;
/// Default per-request timeout for page downloads.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default per-request timeout for analyzer calls.
pub const DEFAULT_ANALYZER_TIMEOUT_SECS: u64 = 300;
/// Default archive directory.
pub const DEFAULT_OUTPUT_DIR: &str = "processed_documents";
/// Default queue file.
pub const DEFAULT_SOURCE_FILE: &str = "source_links.txt";
/// Default processed log.
pub const DEFAULT_PROCESSED_FILE: &str = "processed_links.txt";
/// Default log file for capture runs.
pub const DEFAULT_LOG_FILE: &str = "capture.log";
/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
/// Default Gemini API root.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Default response token cap.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
/// Default user agent for page downloads.
pub const DEFAULT_USER_AGENT: &str = concat!("rac/", env!("CARGO_PKG_VERSION"));

/// Analyzer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerProvider {
    /// Google Gemini `generateContent`
    Gemini,
    /// Any OpenAI-compatible chat completions endpoint
    ChatCompletions,
}

impl AnalyzerProvider {
    /// Parse a provider name (`gemini`, `chat`, `openai`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProvider`] for other names.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "chat" | "openai" | "chat_completions" => Ok(Self::ChatCompletions),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Resolved analyzer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Backend
    pub provider: AnalyzerProvider,
    /// Model name
    pub model: String,
    /// API key (required for Gemini)
    pub api_key: Option<String>,
    /// Gemini API root
    pub base_url: String,
    /// Chat completions endpoint
    pub inference_url: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Response token cap
    pub max_output_tokens: u32,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Fully resolved configuration for a capture run.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Queue of URLs to capture
    pub source_file: PathBuf,
    /// Archive directory
    pub output_dir: PathBuf,
    /// Processed log
    pub processed_file: PathBuf,
    /// Pause between URLs
    pub delay_between_requests: Duration,
    /// Extra fetch attempts after retryable failures
    pub max_retries: u32,
    /// Back-off step; attempt `n` waits `n * retry_backoff`
    pub retry_backoff: Duration,
    /// Page download timeout
    pub request_timeout: Duration,
    /// User agent for page downloads
    pub user_agent: String,
    /// `category` written to every record
    pub category: String,
    /// Log file for capture runs
    pub log_file: PathBuf,
    /// Analyzer settings
    pub analyzer: AnalyzerConfig,
}

impl CaptureConfig {
    /// Apply defaults to merged settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the analyzer provider is unknown.
    pub fn from_settings(settings: RuntimeSettings) -> Result<Self, ConfigError> {
        let RuntimeSettings {
            capture,
            analyzer,
            logging,
        } = settings;

        let provider = analyzer
            .provider
            .as_deref()
            .map_or(Ok(AnalyzerProvider::Gemini), AnalyzerProvider::parse)?;

        Ok(Self {
            source_file: capture
                .source_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_FILE)),
            output_dir: capture
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            processed_file: capture
                .processed_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROCESSED_FILE)),
            delay_between_requests: Duration::from_secs(
                capture
                    .delay_between_requests_secs
                    .unwrap_or(DEFAULT_DELAY_SECS),
            ),
            max_retries: capture.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_backoff: Duration::from_millis(
                capture.retry_backoff_ms.unwrap_or(DEFAULT_RETRY_BACKOFF_MS),
            ),
            request_timeout: Duration::from_secs(
                capture
                    .request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            user_agent: capture
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            category: capture
                .category
                .unwrap_or_else(|| rac_types::DEFAULT_CATEGORY.to_string()),
            log_file: logging
                .file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            analyzer: AnalyzerConfig {
                provider,
                model: analyzer
                    .model
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                api_key: analyzer.api_key.filter(|k| !k.trim().is_empty()),
                base_url: analyzer
                    .base_url
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                inference_url: analyzer.inference_url,
                temperature: analyzer.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                max_output_tokens: analyzer
                    .max_output_tokens
                    .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
                timeout: Duration::from_secs(
                    analyzer
                        .timeout_secs
                        .unwrap_or(DEFAULT_ANALYZER_TIMEOUT_SECS),
                ),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::from_settings(RuntimeSettings::default()).unwrap();
        assert_eq!(config.delay_between_requests, Duration::from_secs(5));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.output_dir, PathBuf::from("processed_documents"));
        assert_eq!(config.source_file, PathBuf::from("source_links.txt"));
        assert_eq!(config.processed_file, PathBuf::from("processed_links.txt"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.category, "programming");
        assert_eq!(config.log_file, PathBuf::from("capture.log"));
        assert_eq!(config.analyzer.provider, AnalyzerProvider::Gemini);
        assert_eq!(config.analyzer.model, "gemini-2.0-flash-exp");
        assert_eq!(config.analyzer.max_output_tokens, 8192);
        assert!(config.analyzer.api_key.is_none());
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(
            AnalyzerProvider::parse("Gemini").unwrap(),
            AnalyzerProvider::Gemini
        );
        assert_eq!(
            AnalyzerProvider::parse("openai").unwrap(),
            AnalyzerProvider::ChatCompletions
        );
        let settings = RuntimeSettings {
            analyzer: AnalyzerSettings {
                provider: Some("bard".into()),
                ..AnalyzerSettings::default()
            },
            ..RuntimeSettings::default()
        };
        assert!(matches!(
            CaptureConfig::from_settings(settings),
            Err(ConfigError::UnknownProvider(name)) if name == "bard"
        ));
    }
}
