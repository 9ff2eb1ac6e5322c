use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use scout_core::{Actor, CoreError, NewRequest, NewSubmission, RequestFilter};
use scout_types::api::{
    CloseRequestRequest, CreateRequestRequest, CreateSubmissionRequest, Empty, ListRequestsQuery,
    RequestDetailResponse, RequestListResponse, RequestResponse, SelectWinnerRequest, Success,
    SubmissionResponse,
};
use scout_types::models::RequestStatus;

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// POST /requests
pub async fn create_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<CreateRequestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let input = NewRequest {
        title: req.title,
        category: req.category,
        description: req.description,
    };

    let request = run_blocking(&state, move |engine| engine.create_request(&actor, input)).await?;

    Ok((StatusCode::CREATED, Json(Success::new(RequestResponse { request }))))
}

/// GET /requests?status=&category=&limit=
pub async fn list_requests(
    State(state): State<AppState>,
    query: Result<Query<ListRequestsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;

    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<RequestStatus>)
        .transpose()
        .map_err(|e| CoreError::invalid_argument(e.to_string()))?;

    let filter = RequestFilter {
        status,
        category: query.category,
        limit: query.limit,
    };

    let requests = run_blocking(&state, move |engine| engine.list_requests(&filter)).await?;
    Ok(Json(Success::new(RequestListResponse { requests })))
}

/// GET /requests/{id}: the request with its ranked submissions.
pub async fn get_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(request_id) = path?;

    let detail = run_blocking(&state, move |engine| engine.request_detail(&actor, request_id)).await?;

    Ok(Json(Success::new(RequestDetailResponse {
        request: detail.request,
        submissions: detail.submissions,
        is_favorite: detail.is_favorite,
    })))
}

/// POST /requests/{id}/submissions
pub async fn create_submission(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CreateSubmissionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(request_id) = path?;
    let Json(req) = payload?;
    let input = NewSubmission {
        link: req.link,
        title: req.title,
        price_cents: req.price_cents,
        note: req.note,
    };

    let submission_id = run_blocking(&state, move |engine| {
        engine.create_submission(&actor, request_id, input)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(Success::new(SubmissionResponse { submission_id })),
    ))
}

/// POST /requests/close
pub async fn close_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<CloseRequestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    run_blocking(&state, move |engine| engine.close_request(&actor, req.request_id)).await?;
    Ok(Json(Success::new(Empty::default())))
}

/// POST /requests/select-winner
pub async fn select_winner(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<SelectWinnerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    run_blocking(&state, move |engine| {
        engine.select_winner(&actor, req.request_id, req.submission_id)
    })
    .await?;
    Ok(Json(Success::new(Empty::default())))
}
