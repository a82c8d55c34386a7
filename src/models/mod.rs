use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of one transcription: the raw transcript and its refined form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionResult {
    pub original_text: String,
    pub refined_text: String,
    pub was_refined: bool,
}

impl TranscriptionResult {
    /// `refined` is `None` when refinement was skipped or failed. A refinement
    /// that returns the text unchanged does not count as refined.
    pub fn new(original_text: String, refined: Option<String>) -> Self {
        match refined {
            Some(refined_text) => Self {
                was_refined: refined_text != original_text,
                original_text,
                refined_text,
            },
            None => Self {
                refined_text: original_text.clone(),
                original_text,
                was_refined: false,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranscriptionData {
    /// Refined transcript, or the original when refinement did not apply
    pub transcription: String,
    pub original_transcription: String,
    pub refined: bool,
    /// Filename as sent by the client
    pub filename: String,
}

impl TranscriptionData {
    pub fn new(result: TranscriptionResult, filename: String) -> Self {
        Self {
            transcription: result.refined_text,
            original_transcription: result.original_text,
            refined: result.was_refined,
            filename,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranscribeResponse {
    pub success: bool,
    pub data: TranscriptionData,
}

impl From<TranscriptionData> for TranscribeResponse {
    fn from(data: TranscriptionData) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Response shape of the legacy `/transcribe` endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LegacyTranscribeResponse {
    pub transcription: String,
    pub original_transcription: String,
    pub refined: bool,
}

impl From<TranscriptionData> for LegacyTranscribeResponse {
    fn from(data: TranscriptionData) -> Self {
        Self {
            transcription: data.transcription,
            original_transcription: data.original_transcription,
            refined: data.refined,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Multipart form accepted by the transcription endpoints
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct TranscribeUpload {
    /// WAV, MP3 or M4A audio, at most 50 MB
    #[schema(value_type = String, format = Binary)]
    pub audio: Vec<u8>,
}
