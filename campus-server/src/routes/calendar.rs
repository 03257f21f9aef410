//! Calendar file endpoints

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use campus_core::calendar_file::NewCalendarFile;
use serde::Serialize;

use crate::routes::AppError;
use crate::state::AppState;

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendar/create", post(create_file))
        .route("/calendar/{filename}", get(download_file))
}

/// Where to download a newly created file
#[derive(Serialize)]
pub struct CreatedFile {
    pub url: String,
    pub filename: String,
}

/// POST /calendar/create - Write a single-event calendar file
async fn create_file(
    State(state): State<AppState>,
    body: Result<Json<NewCalendarFile>, JsonRejection>,
) -> Result<Json<CreatedFile>, AppError> {
    let Json(request) = body.map_err(|e| AppError::bad_request(e.body_text()))?;

    let handle = state.calendar_files.build(&request).await?;

    Ok(Json(CreatedFile {
        url: handle.url(),
        filename: handle.filename,
    }))
}

/// GET /calendar/{filename} - Download a stored calendar file
async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let contents = state.calendar_files.read(&filename).await?;

    // read() only accepts plain file names, so the name is safe to echo
    let headers = [
        (header::CONTENT_TYPE, CALENDAR_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];

    Ok((headers, contents).into_response())
}
