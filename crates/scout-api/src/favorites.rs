use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};

use scout_core::Actor;
use scout_types::api::{FavoritesResponse, Success, ToggleFavoriteRequest, ToggleFavoriteResponse};

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// POST /favorites
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<ToggleFavoriteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let is_favorite =
        run_blocking(&state, move |engine| engine.toggle_favorite(&actor, req.request_id)).await?;

    Ok(Json(Success::new(ToggleFavoriteResponse { is_favorite })))
}

/// GET /favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let requests = run_blocking(&state, move |engine| engine.list_favorites(&actor)).await?;
    Ok(Json(Success::new(FavoritesResponse { requests })))
}
