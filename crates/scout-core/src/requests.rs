use tracing::{info, warn};
use uuid::Uuid;

use scout_db::queries;
use scout_types::models::{Request, RequestStatus, ScoredSubmission};
use scout_types::notifications::NotificationPayload;

use crate::error::{CoreError, Result};
use crate::identity::Actor;
use crate::notifications::enqueue;
use crate::validate::{self, MAX_CATEGORY_LEN, MAX_TEXT_LEN, MAX_TITLE_LEN};
use crate::{Engine, clamp_limit};

#[derive(Debug, Clone, Default)]
pub struct NewRequest {
    pub title: String,
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewSubmission {
    pub link: String,
    pub title: Option<String>,
    pub price_cents: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub category: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RequestDetail {
    pub request: Request,
    /// Highest score first.
    pub submissions: Vec<ScoredSubmission>,
    pub is_favorite: bool,
}

/// Lifecycle transitions are only open to the request's author.
fn require_owner(actor: &Actor, request: &Request) -> Result<()> {
    if request.author_id != actor.id {
        return Err(CoreError::forbidden("Only the request's author can do that"));
    }
    Ok(())
}

fn require_open(request: &Request) -> Result<()> {
    if request.status.is_terminal() {
        return Err(CoreError::invalid_state(format!(
            "Request is already {}",
            request.status
        )));
    }
    Ok(())
}

impl Engine {
    pub fn create_request(&self, actor: &Actor, input: NewRequest) -> Result<Request> {
        let title = validate::required("Title", &input.title, MAX_TITLE_LEN)?;
        let category = validate::required("Category", &input.category, MAX_CATEGORY_LEN)?;
        let description =
            validate::optional("Description", input.description.as_deref(), MAX_TEXT_LEN)?;

        let id = Uuid::new_v4().to_string();
        let author_id = actor.id.to_string();

        let request = self.write(|conn| {
            queries::insert_request(conn, &id, &author_id, &title, &category, description.as_deref())?;
            queries::get_request(conn, &id)?
                .ok_or_else(|| anyhow::anyhow!("Request {} vanished after insert", id))?
                .into_model()
        })?;

        info!("Request {} opened by {}", request.id, actor.id);
        Ok(request)
    }

    pub fn get_request(&self, request_id: Uuid) -> Result<Request> {
        let rid = request_id.to_string();
        self.read(|conn| {
            queries::get_request(conn, &rid)?
                .ok_or(CoreError::NotFound("Request"))?
                .into_model()
        })
    }

    /// Newest first.
    pub fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<Request>> {
        let status = filter.status.map(|s| s.as_str());
        let category = filter
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let limit = clamp_limit(filter.limit);

        self.read(|conn| {
            queries::list_requests(conn, status, category, limit)?
                .into_iter()
                .map(|row| row.into_model())
                .collect()
        })
    }

    /// A request with its ranked submissions, as seen by `viewer`.
    pub fn request_detail(&self, viewer: &Actor, request_id: Uuid) -> Result<RequestDetail> {
        let rid = request_id.to_string();
        let vid = viewer.id.to_string();

        self.read(|conn| {
            let request = queries::get_request(conn, &rid)?
                .ok_or(CoreError::NotFound("Request"))?
                .into_model()?;

            let submissions = queries::list_scored_submissions(conn, &rid, &vid)?
                .into_iter()
                .map(|row| row.into_model(request.winning_submission_id))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let is_favorite = queries::get_favorite_id(conn, &rid, &vid)?.is_some();

            Ok(RequestDetail {
                request,
                submissions,
                is_favorite,
            })
        })
    }

    /// Answer an open request. The request's author is told about answers
    /// from anyone else.
    pub fn create_submission(
        &self,
        actor: &Actor,
        request_id: Uuid,
        input: NewSubmission,
    ) -> Result<Uuid> {
        let link = validate::link(&input.link)?;
        let title = validate::optional("Title", input.title.as_deref(), MAX_TITLE_LEN)?;
        let note = validate::optional("Note", input.note.as_deref(), MAX_TEXT_LEN)?;
        let price_cents = validate::price_cents(input.price_cents)?;

        let submission_id = Uuid::new_v4();
        let rid = request_id.to_string();
        let sid = submission_id.to_string();
        let aid = actor.id.to_string();

        self.write(|conn| {
            let request = queries::get_request(conn, &rid)?
                .ok_or(CoreError::NotFound("Request"))?
                .into_model()?;
            if request.status.is_terminal() {
                return Err(CoreError::invalid_state(format!(
                    "Request is {} and no longer accepts submissions",
                    request.status
                ))
                .into());
            }

            queries::insert_submission(
                conn,
                &sid,
                &rid,
                &aid,
                &link,
                title.as_deref(),
                price_cents,
                note.as_deref(),
            )?;

            if request.author_id != actor.id {
                enqueue(
                    conn,
                    request.author_id,
                    &NotificationPayload::SubmissionReceived {
                        request_id,
                        request_title: request.title.clone(),
                        submission_id,
                        submitter_id: actor.id,
                    },
                )?;
            }
            Ok(())
        })?;

        info!("Submission {} posted to {} by {}", submission_id, request_id, actor.id);
        Ok(submission_id)
    }

    /// `open -> closed`, author only.
    pub fn close_request(&self, actor: &Actor, request_id: Uuid) -> Result<()> {
        let rid = request_id.to_string();

        let result = self.write(|conn| {
            let request = queries::get_request(conn, &rid)?
                .ok_or(CoreError::NotFound("Request"))?
                .into_model()?;
            require_owner(actor, &request)?;
            require_open(&request)?;

            if queries::close_open_request(conn, &rid)? == 0 {
                return Err(CoreError::invalid_state("Request is no longer open").into());
            }
            Ok(())
        });

        match &result {
            Ok(()) => info!("Request {} closed by {}", request_id, actor.id),
            Err(e) => warn!("Close of {} by {} rejected: {}", request_id, actor.id, e),
        }
        result
    }

    /// `open -> solved`, author only. Marks the winner, credits its author's
    /// reputation and notifies them, all in one transaction.
    pub fn select_winner(&self, actor: &Actor, request_id: Uuid, submission_id: Uuid) -> Result<()> {
        let rid = request_id.to_string();
        let sid = submission_id.to_string();
        let award = self.config.winner_reputation_award;

        let result = self.write(|conn| {
            let request = queries::get_request(conn, &rid)?
                .ok_or(CoreError::NotFound("Request"))?
                .into_model()?;
            require_owner(actor, &request)?;
            require_open(&request)?;

            let submission = queries::get_submission(conn, &sid)?
                .filter(|s| s.request_id == rid)
                .ok_or_else(|| {
                    CoreError::invalid_argument("Submission does not belong to this request")
                })?
                .into_model()?;

            if queries::solve_open_request(conn, &rid, &sid)? == 0 {
                return Err(CoreError::invalid_state("Request is no longer open").into());
            }

            let credited = queries::add_reputation(conn, &submission.author_id.to_string(), award)?;
            if credited != 1 {
                anyhow::bail!(
                    "Could not credit winner {} with +{} reputation",
                    submission.author_id,
                    award
                );
            }

            enqueue(
                conn,
                submission.author_id,
                &NotificationPayload::WinnerSelected {
                    request_id,
                    request_title: request.title.clone(),
                    submission_id,
                },
            )?;
            Ok(submission.author_id)
        });

        match result {
            Ok(winner) => {
                info!(
                    "Request {} solved by submission {} (author {}, +{} reputation)",
                    request_id, submission_id, winner, award
                );
                Ok(())
            }
            Err(e) => {
                warn!("Winner selection on {} by {} rejected: {}", request_id, actor.id, e);
                Err(e)
            }
        }
    }
}
