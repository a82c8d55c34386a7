use crate::AppState;
use crate::api::error::{
    AppError, INVALID_FILE_TYPE_MESSAGE, NO_FILE_SELECTED_MESSAGE, NO_FILE_UPLOADED_MESSAGE,
};
use crate::models::{
    ErrorResponse, LegacyTranscribeResponse, TranscribeResponse, TranscribeUpload,
    TranscriptionData,
};
use crate::services::staging::StagedFile;
use crate::utils::validation::validate_extension;
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

/// Name of the multipart field carrying the audio file
pub const AUDIO_FIELD: &str = "audio";

#[utoipa::path(
    post,
    path = "/api/transcribe",
    request_body(content = TranscribeUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcription succeeded", body = TranscribeResponse),
        (status = 400, description = "Missing or invalid file, or no speech detected", body = ErrorResponse),
        (status = 413, description = "File exceeds the upload limit", body = ErrorResponse),
        (status = 500, description = "Recognizer unavailable or processing failed", body = ErrorResponse)
    ),
    tag = "transcription"
)]
pub async fn api_transcribe(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, AppError> {
    let data = process_upload(&state, multipart).await?;
    Ok(Json(data.into()))
}

/// Older clients expect the bare payload without the envelope or filename
#[utoipa::path(
    post,
    path = "/transcribe",
    request_body(content = TranscribeUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcription succeeded", body = LegacyTranscribeResponse),
        (status = 400, description = "Missing or invalid file, or no speech detected", body = ErrorResponse),
        (status = 413, description = "File exceeds the upload limit", body = ErrorResponse),
        (status = 500, description = "Recognizer unavailable or processing failed", body = ErrorResponse)
    ),
    tag = "transcription"
)]
pub async fn legacy_transcribe(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<LegacyTranscribeResponse>, AppError> {
    let data = process_upload(&state, multipart).await?;
    Ok(Json(data.into()))
}

async fn process_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<TranscriptionData, AppError> {
    let service = &state.transcription_service;

    if !service.recognizer_available() {
        if let Ok(mut multipart) = multipart {
            drain(&mut multipart).await;
        }
        return Err(AppError::ModelUnavailable);
    }

    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!("Rejected non-multipart upload: {}", rejection);
        AppError::BadRequest(NO_FILE_UPLOADED_MESSAGE.to_string())
    })?;

    match stage_audio_field(state, &mut multipart).await {
        Ok((staged, filename)) => {
            let result = service.transcribe(staged).await?;
            Ok(TranscriptionData::new(result, filename))
        }
        Err(e) => {
            // Consume the rest of the body so the client sees our response instead of a reset
            tracing::warn!("Upload failed early: {}. Consuming remaining stream...", e);
            drain(&mut multipart).await;
            Err(e)
        }
    }
}

/// Finds the `audio` file part, validates its name and stages its bytes
async fn stage_audio_field(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<(StagedFile, String), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        // A part without a filename is a plain form value, not a file
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        if filename.is_empty() {
            return Err(AppError::BadRequest(NO_FILE_SELECTED_MESSAGE.to_string()));
        }

        validate_extension(&filename).map_err(|e| {
            tracing::info!("Rejected upload: {}", e);
            AppError::BadRequest(INVALID_FILE_TYPE_MESSAGE.to_string())
        })?;

        let reader = StreamReader::new(field.map_err(std::io::Error::other));
        let staged = state
            .transcription_service
            .stage(&filename, reader)
            .await?;

        return Ok((staged, filename));
    }

    Err(AppError::BadRequest(NO_FILE_UPLOADED_MESSAGE.to_string()))
}

async fn drain(multipart: &mut Multipart) {
    while let Ok(Some(mut field)) = multipart.next_field().await {
        while let Ok(Some(_)) = field.chunk().await {}
    }
}
