//! LLM content analysis: classification metadata plus improved Markdown.
//!
//! Backends send [`build_prompt`] as a single user message and hand the
//! reply text to [`parse_analysis`].

mod chat;
mod gemini;
mod parse;
mod prompt;

use async_trait::async_trait;

pub use chat::ChatCompletionsAnalyzer;
pub use gemini::GeminiAnalyzer;
pub use parse::{ContentAnalysis, parse_analysis};
pub use prompt::build_prompt;

use crate::config::{AnalyzerConfig, AnalyzerProvider};
use crate::error::{AnalyzerError, ConfigError};

/// Classifies captured Markdown.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    /// Backend name for logs and errors.
    fn name(&self) -> &'static str;

    /// Send `prompt` and return the reply text.
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError>;

    /// Analyze Markdown captured from `url`.
    async fn analyze(&self, url: &str, markdown: &str) -> Result<ContentAnalysis, AnalyzerError> {
        let prompt = build_prompt(url, markdown);
        let started = std::time::Instant::now();
        let reply = self.complete(&prompt).await?;
        tracing::debug!(
            event = "capture.analyzer.completed",
            provider = self.name(),
            url,
            prompt_chars = prompt.len(),
            reply_chars = reply.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "analyzer reply received"
        );
        Ok(parse_analysis(&reply, markdown))
    }
}

/// Build the analyzer selected by `config`.
///
/// # Errors
///
/// Returns an error when Gemini is selected without an API key, or the chat
/// backend without an endpoint.
pub fn build_analyzer(config: &AnalyzerConfig) -> Result<Box<dyn ContentAnalyzer>, ConfigError> {
    match config.provider {
        AnalyzerProvider::Gemini => {
            let api_key = config.api_key.clone().ok_or(ConfigError::MissingApiKey {
                provider: gemini::PROVIDER,
                env: "GEMINI_API_KEY",
            })?;
            Ok(Box::new(GeminiAnalyzer::new(config, api_key)))
        }
        AnalyzerProvider::ChatCompletions => {
            let inference_url = config
                .inference_url
                .clone()
                .ok_or(ConfigError::MissingInferenceUrl)?;
            Ok(Box::new(ChatCompletionsAnalyzer::new(config, inference_url)))
        }
    }
}
