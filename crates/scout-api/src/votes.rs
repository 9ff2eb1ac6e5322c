use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};

use scout_core::Actor;
use scout_types::api::{CastVoteRequest, CastVoteResponse, Success};

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// POST /votes: toggle the caller's vote on a submission.
pub async fn cast_vote(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let outcome = run_blocking(&state, move |engine| {
        engine.cast_vote(&actor, req.submission_id, req.request_id, req.value)
    })
    .await?;

    Ok(Json(Success::new(CastVoteResponse {
        new_state: outcome.new_state,
        score: outcome.score,
    })))
}
