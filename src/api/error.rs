use crate::models::ErrorResponse;
use crate::services::recognizer::RecognitionError;
use crate::services::staging::StagingError;
use crate::services::transcription_service::TranscribeError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub const MODEL_UNAVAILABLE_MESSAGE: &str =
    "Speech recognition model is not available. Please check server configuration.";
pub const NO_FILE_UPLOADED_MESSAGE: &str = "No file uploaded";
pub const NO_FILE_SELECTED_MESSAGE: &str = "No file selected";
pub const INVALID_FILE_TYPE_MESSAGE: &str =
    "Invalid file type. Please upload WAV, MP3, or M4A files only.";
pub const NO_SPEECH_MESSAGE: &str =
    "No speech detected in the audio file. Please try with a clearer audio recording.";
pub const PROCESSING_FAILED_MESSAGE: &str =
    "Failed to process the audio file. Please try again with a different file.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Speech recognition model is not available")]
    ModelUnavailable,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("No speech detected")]
    NoSpeech,

    #[error("Recognition failed: {0}")]
    Recognition(RecognitionError),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn too_large(limit: usize) -> Self {
        AppError::PayloadTooLarge(format!(
            "File too large. Maximum allowed size is {} MB.",
            limit / 1024 / 1024
        ))
    }
}

impl From<TranscribeError> for AppError {
    fn from(e: TranscribeError) -> Self {
        match e {
            TranscribeError::RecognizerUnavailable => AppError::ModelUnavailable,
            TranscribeError::NoSpeech => AppError::NoSpeech,
            TranscribeError::Recognition(e) => AppError::Recognition(e),
        }
    }
}

impl From<StagingError> for AppError {
    fn from(e: StagingError) -> Self {
        match e {
            StagingError::TooLarge { limit } => AppError::too_large(limit),
            StagingError::ExecutableContent => {
                AppError::BadRequest(INVALID_FILE_TYPE_MESSAGE.to_string())
            }
            StagingError::Read(io_err) => {
                let body_limit_hit = io_err
                    .get_ref()
                    .and_then(|inner| inner.downcast_ref::<MultipartError>())
                    .is_some_and(|m| m.status() == StatusCode::PAYLOAD_TOO_LARGE);

                if body_limit_hit {
                    AppError::PayloadTooLarge(
                        "Request body exceeds the maximum allowed limit".to_string(),
                    )
                } else {
                    AppError::Internal(format!("Upload read failed: {}", io_err))
                }
            }
            StagingError::Write(io_err) => {
                AppError::Internal(format!("Staging write failed: {}", io_err))
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
        } else {
            AppError::Internal(format!("Malformed multipart body: {}", e.body_text()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::ModelUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                MODEL_UNAVAILABLE_MESSAGE.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NoSpeech => (StatusCode::BAD_REQUEST, NO_SPEECH_MESSAGE.to_string()),
            AppError::Recognition(e) => {
                tracing::error!("Recognition error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    PROCESSING_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    UNEXPECTED_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
