use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notifications::NotificationPayload;

/// Returned when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// -- Requests --

/// Lifecycle of a request. `Open` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    Closed,
    Solved,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Solved => "solved",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "solved" => Ok(Self::Solved),
            other => Err(UnknownVariant {
                kind: "request status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub status: RequestStatus,
    pub winning_submission_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// -- Submissions --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub request_id: Uuid,
    pub author_id: Uuid,
    pub link: String,
    pub title: Option<String>,
    pub price_cents: Option<i64>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A submission together with its aggregate score and the viewer's own vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSubmission {
    #[serde(flatten)]
    pub submission: Submission,
    pub score: i64,
    pub my_vote: VoteState,
    pub is_winner: bool,
}

// -- Votes --

/// Direction of a single vote. Stored as +1 / -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = UnknownVariant;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(UnknownVariant {
                kind: "vote value",
                value: other.to_string(),
            }),
        }
    }
}

/// The caller-visible result of a vote toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    #[default]
    None,
    Up,
    Down,
}

impl From<Option<VoteValue>> for VoteState {
    fn from(value: Option<VoteValue>) -> Self {
        match value {
            None => Self::None,
            Some(VoteValue::Up) => Self::Up,
            Some(VoteValue::Down) => Self::Down,
        }
    }
}

// -- Profiles --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub reputation: i64,
    pub created_at: DateTime<Utc>,
}

// -- Notifications --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub read: bool,
    pub payload: NotificationPayload,
    pub created_at: DateTime<Utc>,
}

// -- Reports --

/// Kinds of content a report may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTarget {
    Request,
    Submission,
}

impl ReportTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Submission => "submission",
        }
    }
}

impl FromStr for ReportTarget {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request" => Ok(Self::Request),
            "submission" => Ok(Self::Submission),
            other => Err(UnknownVariant {
                kind: "report target",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub target_type: ReportTarget,
    pub target_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
