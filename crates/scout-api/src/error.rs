use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use scout_core::CoreError;
use scout_types::api::ErrorBody;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request body, path or query could not be decoded.
    #[error("{0}")]
    Malformed(String),

    #[error("Something went wrong, please try again")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::Unauthorized) => StatusCode::UNAUTHORIZED,
            ApiError::Core(CoreError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::Core(CoreError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::InvalidState(_)) => StatusCode::CONFLICT,
            ApiError::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::StoreFailure) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let cases = [
            (CoreError::Unauthorized, StatusCode::UNAUTHORIZED),
            (CoreError::forbidden("no"), StatusCode::FORBIDDEN),
            (CoreError::invalid_argument("bad"), StatusCode::BAD_REQUEST),
            (CoreError::invalid_state("done"), StatusCode::CONFLICT),
            (CoreError::NotFound("Request"), StatusCode::NOT_FOUND),
            (CoreError::StoreFailure, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn message_passes_through() {
        let err = ApiError::from(CoreError::NotFound("Request"));
        assert_eq!(err.to_string(), "Request not found");
    }
}
