use crate::config::TranscribeConfig;
use crate::utils::validation::audio_content_type;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Phrases transcription servers use when the audio holds no recognizable speech
const NO_SPEECH_MARKERS: &[&str] = &["no speech", "audio is too short", "empty audio"];

#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The recognizer ran but found nothing to transcribe
    #[error("no speech detected")]
    NoSpeech,

    #[error("failed to read staged audio: {0}")]
    Io(#[from] std::io::Error),

    #[error("recognizer connection failed: {0}")]
    Connection(String),

    #[error("recognizer timed out")]
    Timeout,

    #[error("recognizer API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected recognizer response: {0}")]
    Parse(String),

    #[error("recognizer misconfigured: {0}")]
    Config(String),
}

impl From<reqwest::Error> for RecognitionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RecognitionError::Timeout
        } else {
            RecognitionError::Connection(e.to_string())
        }
    }
}

/// Trait for speech-to-text backends
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe the audio file at `audio_path`. May return an empty string.
    async fn recognize(&self, audio_path: &Path) -> Result<String, RecognitionError>;

    /// Check if the recognizer is reachable
    async fn health_check(&self) -> bool;

    fn name(&self) -> &str;
}

/// Recognizer backed by an OpenAI-compatible `/audio/transcriptions` endpoint,
/// e.g. a self-hosted Whisper server loaded with a Bangla model.
pub struct WhisperHttpRecognizer {
    client: Client,
    base_url: String,
    model: String,
    language: String,
    api_key: Option<SecretString>,
}

#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

impl WhisperHttpRecognizer {
    pub fn new(
        base_url: String,
        model: String,
        language: String,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, RecognitionError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            language,
            api_key,
        })
    }

    pub fn from_config(config: &TranscribeConfig) -> Result<Self, RecognitionError> {
        Self::new(
            config.recognizer_url.clone(),
            config.recognizer_model.clone(),
            config.recognizer_language.clone(),
            config.recognizer_api_key.clone(),
            Duration::from_secs(config.recognize_timeout_secs),
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }
}

fn is_no_speech_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    NO_SPEECH_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[async_trait]
impl SpeechRecognizer for WhisperHttpRecognizer {
    async fn recognize(&self, audio_path: &Path) -> Result<String, RecognitionError> {
        let url = format!("{}/audio/transcriptions", self.base_url);
        let filename = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();

        let audio = tokio::fs::read(audio_path).await?;

        tracing::debug!(
            "Recognition request: {} bytes, model={}, language={}",
            audio.len(),
            self.model,
            self.language
        );

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(filename.clone())
            .mime_str(audio_content_type(&filename))
            .map_err(|e| RecognitionError::Parse(format!("invalid content type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "json");

        let response = self
            .authorize(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Recognizer request failed: {e}");
                RecognitionError::from(e)
            })?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if status.is_client_error() && is_no_speech_message(&message) {
                return Err(RecognitionError::NoSpeech);
            }

            tracing::error!("Recognizer API error ({status}): {message}");

            return Err(RecognitionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let result: WhisperResponse = response
            .json()
            .await
            .map_err(|e| RecognitionError::Parse(e.to_string()))?;

        Ok(result.text)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        match self.authorize(self.client.get(&url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Recognizer health check failed: {e}");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "whisper-http"
    }
}

/// Factory function to create the configured recognizer.
///
/// Returns `Ok(None)` when recognition is explicitly disabled.
pub fn create_recognizer(
    config: &TranscribeConfig,
) -> Result<Option<Box<dyn SpeechRecognizer>>, RecognitionError> {
    match config.recognizer_type.to_lowercase().as_str() {
        "whisper" | "whisper-http" => Ok(Some(Box::new(WhisperHttpRecognizer::from_config(
            config,
        )?))),
        "none" | "disabled" => Ok(None),
        other => Err(RecognitionError::Config(format!(
            "unknown recognizer type '{other}'"
        ))),
    }
}
