use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use scout_core::require_actor;
use scout_types::api::Claims;

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// Resolve the caller from the bearer token, make sure their profile
/// exists, and attach the resulting `Actor` to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| decode_claims(token, &state.jwt_secret));

    let actor = require_actor(claims.as_ref())?;

    let profile_actor = actor.clone();
    run_blocking(&state, move |engine| engine.get_or_create_profile(&profile_actor)).await?;

    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

fn decode_claims(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| debug!("Rejected token: {}", e))
    .ok()
}
