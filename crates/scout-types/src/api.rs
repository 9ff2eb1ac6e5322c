use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Notification, Profile, Request, ScoredSubmission, VoteState};

// -- JWT Claims --

/// Identity-provider token claims. `sub` is the user id the provider
/// issued; it doubles as the profile id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

// -- Envelope --

/// Successful response: `{ "success": true, ...data }`.
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Payload-free success data.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

/// Failed response: `{ "error": "..." }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// -- Votes --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CastVoteRequest {
    pub submission_id: Uuid,
    pub request_id: Option<Uuid>,
    pub value: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteResponse {
    pub new_state: VoteState,
    pub score: i64,
}

// -- Favorites --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToggleFavoriteRequest {
    pub request_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteResponse {
    pub is_favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub requests: Vec<Request>,
}

// -- Requests --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateRequestRequest {
    pub title: String,
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub request: Request,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequestsQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    pub requests: Vec<Request>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetailResponse {
    pub request: Request,
    pub submissions: Vec<ScoredSubmission>,
    pub is_favorite: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CloseRequestRequest {
    pub request_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectWinnerRequest {
    pub request_id: Uuid,
    pub submission_id: Uuid,
}

// -- Submissions --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSubmissionRequest {
    pub link: String,
    pub title: Option<String>,
    pub price_cents: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub submission_id: Uuid,
}

// -- Notifications --

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread: bool,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarkNotificationReadRequest {
    pub notification_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: usize,
}

// -- Reports --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileReportRequest {
    pub target_type: String,
    pub target_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReportResponse {
    pub report_id: Uuid,
}

// -- Profiles --

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_merges_data() {
        let json = serde_json::to_value(Success::new(ToggleFavoriteResponse { is_favorite: true }))
            .unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "isFavorite": true }));

        let json = serde_json::to_value(Success::new(Empty::default())).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));
    }

    #[test]
    fn vote_request_uses_camel_case_and_optional_request() {
        let req: CastVoteRequest = serde_json::from_value(serde_json::json!({
            "submissionId": Uuid::nil(),
            "value": -1,
        }))
        .unwrap();
        assert_eq!(req.value, -1);
        assert!(req.request_id.is_none());

        let bad = serde_json::from_value::<CastVoteRequest>(serde_json::json!({
            "submissionId": Uuid::nil(),
            "value": 1,
            "weight": 5,
        }));
        assert!(bad.is_err());
    }
}
