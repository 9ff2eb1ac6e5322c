//! Database row types. These map directly to SQLite rows and are
//! distinct from the scout-types models to keep the DB layer independent.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use scout_types::models::{
    Notification, Profile, Report, ReportTarget, Request, RequestStatus, ScoredSubmission, Submission,
    VoteState, VoteValue,
};
use scout_types::notifications::NotificationPayload;

pub struct ProfileRow {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub reputation: i64,
    pub created_at: String,
}

pub struct RequestRow {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub status: String,
    pub winning_submission_id: Option<String>,
    pub created_at: String,
}

pub struct SubmissionRow {
    pub id: String,
    pub request_id: String,
    pub author_id: String,
    pub link: String,
    pub title: Option<String>,
    pub price_cents: Option<i64>,
    pub note: Option<String>,
    pub created_at: String,
}

/// A submission joined with its vote total and the viewer's vote value.
pub struct ScoredSubmissionRow {
    pub submission: SubmissionRow,
    pub score: i64,
    pub viewer_vote: Option<i64>,
}

pub struct VoteRow {
    pub id: String,
    pub submission_id: String,
    pub user_id: String,
    pub value: i64,
}

pub struct NotificationRow {
    pub id: String,
    pub recipient_id: String,
    pub read: bool,
    pub payload: String,
    pub created_at: String,
}

pub struct ReportRow {
    pub id: String,
    pub reporter_id: String,
    pub target_type: String,
    pub target_id: String,
    pub reason: String,
    pub created_at: String,
}

/// Parse a stored timestamp. Column defaults produce `YYYY-MM-DD HH:MM:SS.SSS`
/// without a zone; RFC 3339 is accepted too.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|n| n.and_utc()))
        .with_context(|| format!("Corrupt timestamp '{}'", raw))
}

fn parse_id(raw: &str, column: &str) -> Result<Uuid> {
    raw.parse()
        .with_context(|| format!("Corrupt {} '{}'", column, raw))
}

impl ProfileRow {
    pub fn into_model(self) -> Result<Profile> {
        Ok(Profile {
            id: parse_id(&self.id, "profiles.id")?,
            username: self.username,
            display_name: self.display_name,
            bio: self.bio,
            reputation: self.reputation,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl RequestRow {
    pub fn status(&self) -> Result<RequestStatus> {
        Ok(self.status.parse()?)
    }

    pub fn into_model(self) -> Result<Request> {
        let status = self.status()?;
        Ok(Request {
            id: parse_id(&self.id, "requests.id")?,
            author_id: parse_id(&self.author_id, "requests.author_id")?,
            title: self.title,
            category: self.category,
            description: self.description,
            status,
            winning_submission_id: self
                .winning_submission_id
                .as_deref()
                .map(|id| parse_id(id, "requests.winning_submission_id"))
                .transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl SubmissionRow {
    pub fn into_model(self) -> Result<Submission> {
        Ok(Submission {
            id: parse_id(&self.id, "submissions.id")?,
            request_id: parse_id(&self.request_id, "submissions.request_id")?,
            author_id: parse_id(&self.author_id, "submissions.author_id")?,
            link: self.link,
            title: self.title,
            price_cents: self.price_cents,
            note: self.note,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl ScoredSubmissionRow {
    pub fn into_model(self, winning_submission_id: Option<Uuid>) -> Result<ScoredSubmission> {
        let my_vote = self.viewer_vote.map(VoteValue::try_from).transpose()?;
        let submission = self.submission.into_model()?;
        Ok(ScoredSubmission {
            is_winner: winning_submission_id == Some(submission.id),
            submission,
            score: self.score,
            my_vote: VoteState::from(my_vote),
        })
    }
}

impl VoteRow {
    pub fn value(&self) -> Result<VoteValue> {
        Ok(VoteValue::try_from(self.value)?)
    }
}

impl NotificationRow {
    pub fn into_model(self) -> Result<Notification> {
        let payload: NotificationPayload = serde_json::from_str(&self.payload)
            .with_context(|| format!("Corrupt payload on notification '{}'", self.id))?;
        Ok(Notification {
            id: parse_id(&self.id, "notifications.id")?,
            recipient_id: parse_id(&self.recipient_id, "notifications.recipient_id")?,
            read: self.read,
            payload,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl ReportRow {
    pub fn into_model(self) -> Result<Report> {
        Ok(Report {
            id: parse_id(&self.id, "reports.id")?,
            reporter_id: parse_id(&self.reporter_id, "reports.reporter_id")?,
            target_type: self.target_type.parse::<ReportTarget>()?,
            target_id: parse_id(&self.target_id, "reports.target_id")?,
            reason: self.reason,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}
