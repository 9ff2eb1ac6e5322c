use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{favorites, notifications, profiles, reports, requests, votes};

/// Full HTTP surface. Everything except `/health` requires a bearer token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    let protected_routes = Router::new()
        .route("/me", get(profiles::me))
        .route("/profiles/{id}", get(profiles::get_profile))
        .route("/requests", post(requests::create_request).get(requests::list_requests))
        .route("/requests/close", post(requests::close_request))
        .route("/requests/select-winner", post(requests::select_winner))
        .route("/requests/{id}", get(requests::get_request))
        .route("/requests/{id}/submissions", post(requests::create_submission))
        .route("/votes", post(votes::cast_vote))
        .route("/favorites", post(favorites::toggle_favorite).get(favorites::list_favorites))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read", post(notifications::mark_read))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/reports", post(reports::file_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}
