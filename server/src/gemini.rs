//! Gemini-backed answer generator.
//!
//! Calls the `generateContent` REST endpoint with a single-turn prompt built
//! from the grounding text and the user's query. Every failure (transport,
//! timeout, non-2xx status, empty candidates) is logged and reported as "no
//! answer".

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use orderdesk_core::answer::build_prompt;
use orderdesk_core::AnswerGenerator;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read `GEMINI_API_KEY` and friends. Returns `None` when the key is
    /// unset or blank, which leaves answer generation disabled.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = url;
        }
        if let Some(timeout) = std::env::var("GEMINI_TIMEOUT_SECS").ok().and_then(|s| parse_timeout_secs(&s)) {
            config.timeout = timeout;
        }
        Some(config)
    }
}

/// Whole seconds, strictly positive. Zero or garbage falls back to the default.
fn parse_timeout_secs(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().filter(|&secs| secs > 0).map(Duration::from_secs)
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

pub struct GeminiGenerator {
    client: Client,
    config: GeminiConfig,
}

impl GeminiGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn call(&self, prompt: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            return Err(anyhow!("gemini returned {status}: {error_body}"));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    fn id(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, grounding: &str, query: &str) -> Option<String> {
        let prompt = build_prompt(grounding, query);
        match self.call(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, model = %self.config.model, "answer generation failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_must_be_positive() {
        assert_eq!(parse_timeout_secs("0"), None);
        assert_eq!(parse_timeout_secs("soon"), None);
        assert_eq!(parse_timeout_secs(" 30 "), Some(Duration::from_secs(30)));
    }
}
