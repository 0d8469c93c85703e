//! Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ContentAnalyzer;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;

pub(super) const PROVIDER: &str = "Gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Analyzer backed by the Gemini API.
pub struct GeminiAnalyzer {
    client: Client,
    endpoint: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiAnalyzer {
    /// Create a Gemini analyzer for `config.model` under `config.base_url`.
    #[must_use]
    pub fn new(config: &AnalyzerConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[async_trait]
impl ContentAnalyzer for GeminiAnalyzer {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };
        let request_failed = |source| AnalyzerError::Request {
            provider: PROVIDER,
            source,
        };
        let res = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;
        let status = res.status();
        let text = res.text().await.map_err(request_failed)?;
        if !status.is_success() {
            return Err(AnalyzerError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: text,
            });
        }
        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| AnalyzerError::Decode {
                provider: PROVIDER,
                message: format!("{e}; body: {text}"),
            })?;
        let reply: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if reply.trim().is_empty() {
            return Err(AnalyzerError::EmptyResponse { provider: PROVIDER });
        }
        Ok(reply)
    }
}
