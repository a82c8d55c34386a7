use crate::config::TranscribeConfig;
use crate::models::TranscriptionResult;
use crate::services::recognizer::{RecognitionError, SpeechRecognizer};
use crate::services::refiner::TextRefiner;
use crate::services::staging::{StagedFile, StagingError, stage_upload};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("speech recognizer is not available")]
    RecognizerUnavailable,

    #[error("no speech detected")]
    NoSpeech,

    #[error("recognition failed: {0}")]
    Recognition(RecognitionError),
}

/// Runs uploads through recognition and refinement.
///
/// Both collaborators are optional: a missing recognizer makes every
/// transcription fail with [`TranscribeError::RecognizerUnavailable`], a
/// missing refiner returns transcripts unrefined.
pub struct TranscriptionService {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    refiner: Option<Arc<dyn TextRefiner>>,
    upload_dir: PathBuf,
    max_file_size: usize,
    recognize_timeout: Duration,
    refine_timeout: Duration,
}

impl TranscriptionService {
    pub fn new(
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        refiner: Option<Arc<dyn TextRefiner>>,
        config: &TranscribeConfig,
    ) -> Self {
        Self {
            recognizer,
            refiner,
            upload_dir: config.upload_dir.clone(),
            max_file_size: config.max_file_size,
            recognize_timeout: Duration::from_secs(config.recognize_timeout_secs),
            refine_timeout: Duration::from_secs(config.refine_timeout_secs),
        }
    }

    pub fn recognizer_available(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn refinement_enabled(&self) -> bool {
        self.refiner.is_some()
    }

    pub async fn health_check(&self) -> bool {
        match &self.recognizer {
            Some(recognizer) => recognizer.health_check().await,
            None => false,
        }
    }

    pub async fn stage<R>(&self, filename: &str, reader: R) -> Result<StagedFile, StagingError>
    where
        R: AsyncRead + Unpin + Send,
    {
        stage_upload(&self.upload_dir, filename, reader, self.max_file_size).await
    }

    /// Recognizes and refines a staged upload. The staged file is consumed and
    /// removed before this returns, whatever the outcome.
    pub async fn transcribe(
        &self,
        staged: StagedFile,
    ) -> Result<TranscriptionResult, TranscribeError> {
        let recognizer = self
            .recognizer
            .as_ref()
            .ok_or(TranscribeError::RecognizerUnavailable)?;

        tracing::info!(
            "Recognizing {} ({} bytes) with {}",
            staged.path().display(),
            staged.size(),
            recognizer.name()
        );

        let recognized =
            match tokio::time::timeout(self.recognize_timeout, recognizer.recognize(staged.path()))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(RecognitionError::Timeout),
            };

        let staged_path = staged.path().to_path_buf();
        if let Err(e) = staged.remove() {
            tracing::warn!(
                "Failed to remove staged file {}: {}",
                staged_path.display(),
                e
            );
        }

        let original = match recognized {
            Ok(text) => text,
            Err(RecognitionError::NoSpeech) => return Err(TranscribeError::NoSpeech),
            Err(e) => {
                tracing::error!("Transcription error: {}", e);
                return Err(TranscribeError::Recognition(e));
            }
        };

        if original.trim().is_empty() {
            return Err(TranscribeError::NoSpeech);
        }

        tracing::debug!("Original transcription: {}", original);
        let refined = self.refine(&original).await;
        if let Some(text) = &refined {
            tracing::debug!("Refined transcription: {}", text);
        }

        Ok(TranscriptionResult::new(original, refined))
    }

    /// Returns `None` when refinement is disabled or fails for any reason
    async fn refine(&self, text: &str) -> Option<String> {
        let refiner = self.refiner.as_ref()?;

        match tokio::time::timeout(self.refine_timeout, refiner.refine(text)).await {
            Ok(Ok(refined)) => Some(refined),
            Ok(Err(e)) => {
                tracing::warn!("Error refining text with {}: {}", refiner.name(), e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Refinement with {} timed out after {:?}",
                    refiner.name(),
                    self.refine_timeout
                );
                None
            }
        }
    }
}
