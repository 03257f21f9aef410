//! Speech-to-text endpoint

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use campus_core::CampusError;
use serde::Serialize;

use crate::routes::AppError;
use crate::state::AppState;

/// Largest upload the transcription API accepts.
const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

const FALLBACK_FILENAME: &str = "audio";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stt", post(transcribe))
        .layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES))
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub text: String,
}

/// POST /stt - Transcribe the uploaded `file` field
async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptResponse>, AppError> {
    // Fail before reading the upload when no credentials are configured
    if !state.transcriber.is_configured() {
        return Err(CampusError::Configuration("OPENAI_API_KEY not set".into()).into());
    }

    let (filename, audio) = read_audio(&mut multipart).await?;
    tracing::info!(%filename, size = audio.len(), "transcribing upload");

    let text = state.transcriber.transcribe(&filename, audio).await?;

    Ok(Json(TranscriptResponse { text }))
}

async fn read_audio(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();
        let audio = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read upload: {e}")))?;

        if audio.is_empty() {
            return Err(AppError::bad_request("Uploaded file is empty"));
        }
        return Ok((filename, audio));
    }

    Err(AppError::bad_request("Missing required field: file"))
}
