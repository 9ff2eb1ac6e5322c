use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use scout_core::Actor;
use scout_types::api::{FileReportRequest, FileReportResponse, Success};

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// POST /reports: record an abuse report for moderators.
pub async fn file_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<FileReportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let report_id = run_blocking(&state, move |engine| {
        engine.file_report(&actor, &req.target_type, req.target_id, &req.reason)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(Success::new(FileReportResponse { report_id })),
    ))
}
