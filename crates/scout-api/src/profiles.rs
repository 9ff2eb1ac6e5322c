use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
    response::IntoResponse,
};
use uuid::Uuid;

use scout_core::Actor;
use scout_types::api::{ProfileResponse, Success};

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// GET /me
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = run_blocking(&state, move |engine| engine.get_or_create_profile(&actor)).await?;
    Ok(Json(Success::new(ProfileResponse { profile })))
}

/// GET /profiles/{id}
pub async fn get_profile(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(user_id) = path?;
    let profile = run_blocking(&state, move |engine| engine.get_profile(user_id)).await?;
    Ok(Json(Success::new(ProfileResponse { profile })))
}
