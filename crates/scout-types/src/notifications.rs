use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events recorded in a recipient's notification inbox.
/// Stored as JSON in the `notifications.payload` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum NotificationPayload {
    /// The recipient's submission was picked as the answer to a request
    WinnerSelected {
        request_id: Uuid,
        request_title: String,
        submission_id: Uuid,
    },

    /// Someone else answered a request the recipient posted
    SubmissionReceived {
        request_id: Uuid,
        request_title: String,
        submission_id: Uuid,
        submitter_id: Uuid,
    },
}

impl NotificationPayload {
    /// The request this event is about.
    pub fn request_id(&self) -> Uuid {
        match self {
            Self::WinnerSelected { request_id, .. } => *request_id,
            Self::SubmissionReceived { request_id, .. } => *request_id,
        }
    }
}
