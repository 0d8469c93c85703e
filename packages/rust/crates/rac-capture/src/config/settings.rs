//! Runtime settings loader for rac.
//!
//! Loads and merges, later layers winning field by field:
//! - Project file: `rac.yaml` in the working directory (or `--config <file>`)
//! - User file:    `$XDG_CONFIG_HOME/rac/settings.yaml` (default `~/.config`)
//! - Environment:  `GEMINI_API_KEY`, `DELAY_BETWEEN_REQUESTS`, `MAX_RETRIES`,
//!   `OUTPUT_DIR`, `SOURCE_FILE`, `PROCESSED_FILE`, `RAC_LOG_FILE`, read from
//!   the process first and then from `.env` in the working directory
//!
//! CLI flags are merged on top by the binary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_PROJECT_SETTINGS_FILE: &str = "rac.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "rac/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
const DEFAULT_DOTENV_FILE: &str = ".env";

/// One settings layer; every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuntimeSettings {
    /// `capture:` section
    #[serde(default)]
    pub capture: CaptureSettings,
    /// `analyzer:` section
    #[serde(default)]
    pub analyzer: AnalyzerSettings,
    /// `logging:` section
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Queue, archive and fetch settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CaptureSettings {
    /// Queue file of URLs to capture
    pub source_file: Option<PathBuf>,
    /// Archive directory
    pub output_dir: Option<PathBuf>,
    /// Append-only log of finished captures
    pub processed_file: Option<PathBuf>,
    /// Pause between URLs
    pub delay_between_requests_secs: Option<u64>,
    /// Extra fetch attempts after a retryable failure
    pub max_retries: Option<u32>,
    /// Base backoff, doubled per attempt
    pub retry_backoff_ms: Option<u64>,
    /// Per-request fetch timeout
    pub request_timeout_secs: Option<u64>,
    /// `User-Agent` sent with page fetches
    pub user_agent: Option<String>,
    /// Category written to every record
    pub category: Option<String>,
}

/// LLM backend settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalyzerSettings {
    /// `gemini` or `chat`
    pub provider: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// API key; `GEMINI_API_KEY` is the usual source
    pub api_key: Option<String>,
    /// Gemini API root
    pub base_url: Option<String>,
    /// Full chat-completions endpoint for the `chat` provider
    pub inference_url: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Response token cap
    pub max_output_tokens: Option<u32>,
    /// Analyzer request timeout
    pub timeout_secs: Option<u64>,
}

/// Log file settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoggingSettings {
    /// File that `run` and `capture` append to
    pub file: Option<PathBuf>,
}

impl RuntimeSettings {
    /// Overlay `overlay` on `self`; fields set in `overlay` win.
    #[must_use]
    pub fn merge(self, overlay: Self) -> Self {
        Self {
            capture: self.capture.merge(overlay.capture),
            analyzer: self.analyzer.merge(overlay.analyzer),
            logging: self.logging.merge(overlay.logging),
        }
    }

    /// Settings taken from process environment variables, falling back to
    /// `.env` in the working directory.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_dotenv(|key| std::env::var(key).ok(), Path::new(DEFAULT_DOTENV_FILE))
    }

    /// Settings from `lookup`, with `dotenv` filling variables it leaves unset.
    ///
    /// The file never overrides a variable `lookup` knows about.
    #[must_use]
    pub fn from_env_with_dotenv<F>(lookup: F, dotenv: &Path) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = read_dotenv(dotenv);
        Self::from_env_with(|key| lookup(key).or_else(|| file_vars.get(key).cloned()))
    }

    /// Settings taken from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset; unparsable numbers are ignored
    /// with a warning.
    #[must_use]
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let delay = var("DELAY_BETWEEN_REQUESTS");
        let retries = var("MAX_RETRIES");
        Self {
            capture: CaptureSettings {
                source_file: var("SOURCE_FILE").map(PathBuf::from),
                output_dir: var("OUTPUT_DIR").map(PathBuf::from),
                processed_file: var("PROCESSED_FILE").map(PathBuf::from),
                delay_between_requests_secs: parse_env("DELAY_BETWEEN_REQUESTS", delay),
                max_retries: parse_env("MAX_RETRIES", retries),
                ..CaptureSettings::default()
            },
            analyzer: AnalyzerSettings {
                api_key: var("GEMINI_API_KEY"),
                ..AnalyzerSettings::default()
            },
            logging: LoggingSettings {
                file: var("RAC_LOG_FILE").map(PathBuf::from),
            },
        }
    }
}

impl CaptureSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            source_file: overlay.source_file.or(self.source_file),
            output_dir: overlay.output_dir.or(self.output_dir),
            processed_file: overlay.processed_file.or(self.processed_file),
            delay_between_requests_secs: overlay
                .delay_between_requests_secs
                .or(self.delay_between_requests_secs),
            max_retries: overlay.max_retries.or(self.max_retries),
            retry_backoff_ms: overlay.retry_backoff_ms.or(self.retry_backoff_ms),
            request_timeout_secs: overlay.request_timeout_secs.or(self.request_timeout_secs),
            user_agent: overlay.user_agent.or(self.user_agent),
            category: overlay.category.or(self.category),
        }
    }
}

impl AnalyzerSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            provider: overlay.provider.or(self.provider),
            model: overlay.model.or(self.model),
            api_key: overlay.api_key.or(self.api_key),
            base_url: overlay.base_url.or(self.base_url),
            inference_url: overlay.inference_url.or(self.inference_url),
            temperature: overlay.temperature.or(self.temperature),
            max_output_tokens: overlay.max_output_tokens.or(self.max_output_tokens),
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
        }
    }
}

impl LoggingSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            file: overlay.file.or(self.file),
        }
    }
}

/// Load merged settings: project file, then user file, then environment.
///
/// `project_override` replaces the default `rac.yaml` lookup.
#[must_use]
pub fn load_runtime_settings(project_override: Option<&Path>) -> RuntimeSettings {
    let (project_path, user_path) = runtime_settings_paths(project_override);
    load_runtime_settings_from_paths(&project_path, &user_path).merge(RuntimeSettings::from_env())
}

#[doc(hidden)]
#[must_use]
pub fn runtime_settings_paths(project_override: Option<&Path>) -> (PathBuf, PathBuf) {
    let project_path = project_override.map_or_else(
        || PathBuf::from(DEFAULT_PROJECT_SETTINGS_FILE),
        Path::to_path_buf,
    );
    let user_path = resolve_config_home().join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (project_path, user_path)
}

#[doc(hidden)]
#[must_use]
pub fn load_runtime_settings_from_paths(project: &Path, user: &Path) -> RuntimeSettings {
    load_one(project).merge(load_one(user))
}

fn load_one(path: &Path) -> RuntimeSettings {
    if !path.exists() {
        return RuntimeSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RuntimeSettings::default();
        }
    };
    if raw.trim().is_empty() {
        return RuntimeSettings::default();
    }
    match serde_yaml::from_str::<RuntimeSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            RuntimeSettings::default()
        }
    }
}

/// Variables from a `.env` file.
///
/// A missing file gives no variables. Malformed lines are skipped with a
/// warning.
#[must_use]
pub fn read_dotenv(path: &Path) -> HashMap<String, String> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(error) if error.not_found() => return HashMap::new(),
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read .env file; ignoring"
            );
            return HashMap::new();
        }
    };
    entries
        .filter_map(|entry| match entry {
            Ok(pair) => Some(pair),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %error,
                    "skipping malformed .env line"
                );
                None
            }
        })
        .collect()
}

fn parse_env<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "ignoring unparsable environment value");
            None
        }
    }
}

fn resolve_config_home() -> PathBuf {
    let non_empty = |key: &str| {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    if let Some(xdg) = non_empty("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    non_empty("HOME").map_or_else(
        || PathBuf::from(DEFAULT_CONFIG_HOME_RELATIVE_PATH),
        |home| PathBuf::from(home).join(DEFAULT_CONFIG_HOME_RELATIVE_PATH),
    )
}
