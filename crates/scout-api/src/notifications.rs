use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::IntoResponse,
};

use scout_core::Actor;
use scout_types::api::{
    Empty, MarkAllReadResponse, MarkNotificationReadRequest, NotificationsQuery,
    NotificationsResponse, Success,
};

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// GET /notifications?unread=&limit=
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    query: Result<Query<NotificationsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;

    let (notifications, unread_count) = run_blocking(&state, move |engine| {
        let notifications = engine.list_notifications(&actor, query.unread, query.limit)?;
        let unread_count = engine.unread_notification_count(&actor)?;
        Ok((notifications, unread_count))
    })
    .await?;

    Ok(Json(Success::new(NotificationsResponse {
        notifications,
        unread_count,
    })))
}

/// POST /notifications/read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<MarkNotificationReadRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    run_blocking(&state, move |engine| {
        engine.mark_notification_read(&actor, req.notification_id)
    })
    .await?;
    Ok(Json(Success::new(Empty::default())))
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let updated =
        run_blocking(&state, move |engine| engine.mark_all_notifications_read(&actor)).await?;
    Ok(Json(Success::new(MarkAllReadResponse { updated })))
}
