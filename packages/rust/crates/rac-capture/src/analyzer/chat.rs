//! OpenAI-compatible chat completions backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ContentAnalyzer;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;

const PROVIDER: &str = "Chat completions";

/// Request body for chat completions (OpenAI format).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response: choices[0].message.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Analyzer backed by any chat completions endpoint.
pub struct ChatCompletionsAnalyzer {
    client: Client,
    inference_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionsAnalyzer {
    /// Create an analyzer posting to `inference_url`.
    #[must_use]
    pub fn new(config: &AnalyzerConfig, inference_url: String) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            inference_url,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_output_tokens,
        }
    }
}

#[async_trait]
impl ContentAnalyzer for ChatCompletionsAnalyzer {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let request_failed = |source| AnalyzerError::Request {
            provider: PROVIDER,
            source,
        };
        let mut req = self.client.post(&self.inference_url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        let res = req.send().await.map_err(request_failed)?;
        let status = res.status();
        let text = res.text().await.map_err(request_failed)?;
        if !status.is_success() {
            return Err(AnalyzerError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: text,
            });
        }
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| AnalyzerError::Decode {
                provider: PROVIDER,
                message: format!("{e}; body: {text}"),
            })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AnalyzerError::EmptyResponse { provider: PROVIDER })
    }
}
