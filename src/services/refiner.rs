//! Grammar and spelling refinement of raw transcripts through a hosted
//! chat-completions API.

use crate::config::TranscribeConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;

pub const REFINE_SYSTEM_PROMPT: &str = "You are a helpful assistant that refines Bangla text. \
Do not translate, just fix spelling, grammar, and missing words. Keep the text in Bangla language. \
If the input is empty or very short, return it as is.";

#[derive(Debug, Error)]
pub enum RefineError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("refinement request timed out")]
    Timeout,

    #[error("refinement API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse refinement response: {0}")]
    Parse(String),

    #[error("refinement API returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for RefineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RefineError::Timeout
        } else {
            RefineError::Request(e.to_string())
        }
    }
}

/// Trait for transcript refinement backends
#[async_trait]
pub trait TextRefiner: Send + Sync {
    async fn refine(&self, text: &str) -> Result<String, RefineError>;

    fn name(&self) -> &str;
}

/// Calls an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiRefiner {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiRefiner {
    pub fn new(
        base_url: String,
        api_key: SecretString,
        model: String,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, RefineError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
            max_tokens,
        })
    }

    /// Returns `Ok(None)` when no API key is configured
    pub fn from_config(config: &TranscribeConfig) -> Result<Option<Self>, RefineError> {
        let Some(api_key) = config.openai_api_key.clone() else {
            return Ok(None);
        };

        Self::new(
            config.openai_base_url.clone(),
            api_key,
            config.refine_model.clone(),
            config.refine_temperature,
            config.refine_max_tokens,
            Duration::from_secs(config.refine_timeout_secs),
        )
        .map(Some)
    }
}

#[async_trait]
impl TextRefiner for OpenAiRefiner {
    async fn refine(&self, text: &str) -> Result<String, RefineError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": REFINE_SYSTEM_PROMPT },
                { "role": "user", "content": text }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RefineError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RefineError::Parse(e.to_string()))?;

        let refined = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(RefineError::EmptyResponse)?
            .trim()
            .to_string();

        if refined.is_empty() {
            return Err(RefineError::EmptyResponse);
        }

        Ok(refined)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
