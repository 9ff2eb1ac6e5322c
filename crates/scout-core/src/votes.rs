use tracing::{debug, warn};
use uuid::Uuid;

use scout_db::{DbConnection, is_unique_violation, queries};
use scout_types::models::{VoteState, VoteValue};

use crate::error::{CoreError, Result};
use crate::identity::Actor;
use crate::ledger::{VoteAction, decide_vote};
use crate::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub new_state: VoteState,
    /// Submission score after the vote was applied.
    pub score: i64,
}

impl Engine {
    /// Toggle `actor`'s vote on a submission in the direction of `value`.
    ///
    /// Casting the same direction twice retracts the vote; casting the
    /// opposite direction switches it. `request_id`, when given, must be the
    /// request the submission belongs to.
    pub fn cast_vote(
        &self,
        actor: &Actor,
        submission_id: Uuid,
        request_id: Option<Uuid>,
        value: i64,
    ) -> Result<VoteOutcome> {
        let requested = VoteValue::try_from(value)
            .map_err(|_| CoreError::invalid_argument("Vote value must be 1 or -1"))?;

        let sid = submission_id.to_string();
        let uid = actor.id.to_string();

        let outcome = self.write(|conn| {
            let submission = queries::get_submission(conn, &sid)?
                .ok_or_else(|| CoreError::invalid_argument("Submission does not exist"))?;

            if let Some(request_id) = request_id {
                if submission.request_id != request_id.to_string() {
                    return Err(CoreError::invalid_argument(
                        "Submission does not belong to this request",
                    )
                    .into());
                }
            }

            let existing = queries::get_vote(conn, &sid, &uid)?
                .map(|row| row.value())
                .transpose()?;

            let new_state = apply_vote(conn, &sid, &uid, decide_vote(existing, requested))?;
            let score = queries::submission_score(conn, &sid)?;

            Ok(VoteOutcome { new_state, score })
        })?;

        debug!(
            "Vote by {} on {}: {:?} (score {})",
            actor.id, submission_id, outcome.new_state, outcome.score
        );
        Ok(outcome)
    }

    /// Sum of all vote values on a submission.
    pub fn submission_score(&self, submission_id: Uuid) -> Result<i64> {
        let sid = submission_id.to_string();
        self.read(|conn| {
            queries::get_submission(conn, &sid)?.ok_or(CoreError::NotFound("Submission"))?;
            queries::submission_score(conn, &sid)
        })
    }
}

/// Apply one ledger action for `(submission_id, user_id)`.
///
/// An insert that hits the uniqueness constraint means a concurrent caller
/// already recorded a vote; it is retried once as an update.
pub(crate) fn apply_vote(
    conn: &DbConnection,
    submission_id: &str,
    user_id: &str,
    action: VoteAction,
) -> anyhow::Result<VoteState> {
    match action {
        VoteAction::Insert(value) => {
            let id = Uuid::new_v4().to_string();
            match queries::insert_vote(conn, &id, submission_id, user_id, value.as_i64()) {
                Ok(()) => {}
                Err(e) if is_unique_violation(&e) => {
                    warn!(
                        "Duplicate vote insert for ({}, {}), retrying as update",
                        submission_id, user_id
                    );
                    queries::update_vote(conn, submission_id, user_id, value.as_i64())?;
                }
                Err(e) => return Err(e),
            }
        }
        VoteAction::Update(value) => {
            queries::update_vote(conn, submission_id, user_id, value.as_i64())?;
        }
        VoteAction::Delete => {
            queries::delete_vote(conn, submission_id, user_id)?;
        }
    }

    Ok(action.resulting_state())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::testutil::{Fixture, fixture};

    fn stored_vote(fx: &Fixture, submission: Uuid, actor: &Actor) -> Option<i64> {
        fx.db_vote(submission, actor.id)
    }

    #[test]
    fn same_direction_twice_retracts() {
        let fx = fixture();
        let voter = fx.user("bob");
        let s = fx.submission_by(&fx.user("carol"));

        let first = fx.engine.cast_vote(&voter, s, None, 1).unwrap();
        assert_eq!(first, VoteOutcome { new_state: VoteState::Up, score: 1 });

        let second = fx.engine.cast_vote(&voter, s, None, 1).unwrap();
        assert_eq!(second, VoteOutcome { new_state: VoteState::None, score: 0 });
        assert_eq!(stored_vote(&fx, s, &voter), None);
    }

    #[test]
    fn opposite_direction_switches() {
        let fx = fixture();
        let voter = fx.user("bob");
        let s = fx.submission_by(&fx.user("carol"));

        fx.engine.cast_vote(&voter, s, None, 1).unwrap();
        let outcome = fx.engine.cast_vote(&voter, s, None, -1).unwrap();

        assert_eq!(outcome, VoteOutcome { new_state: VoteState::Down, score: -1 });
        assert_eq!(stored_vote(&fx, s, &voter), Some(-1));
    }

    #[test]
    fn score_sums_all_voters() {
        let fx = fixture();
        let s = fx.submission_by(&fx.user("carol"));

        for name in ["u1", "u2", "u3"] {
            fx.engine.cast_vote(&fx.user(name), s, None, 1).unwrap();
        }
        fx.engine.cast_vote(&fx.user("u4"), s, None, -1).unwrap();

        assert_eq!(fx.engine.submission_score(s).unwrap(), 2);
    }

    #[test]
    fn invalid_value_touches_nothing() {
        let fx = fixture();
        let voter = fx.user("bob");
        let s = fx.submission_by(&fx.user("carol"));

        for value in [0, 2, -5] {
            let err = fx.engine.cast_vote(&voter, s, None, value).unwrap_err();
            assert!(matches!(err, CoreError::InvalidArgument(_)));
        }
        assert_eq!(stored_vote(&fx, s, &voter), None);
    }

    #[test]
    fn unknown_submission_is_invalid_argument() {
        let fx = fixture();
        let err = fx
            .engine
            .cast_vote(&fx.user("bob"), Uuid::new_v4(), None, 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn mismatched_request_is_rejected() {
        let fx = fixture();
        let voter = fx.user("bob");
        let s = fx.submission_by(&fx.user("carol"));

        let err = fx
            .engine
            .cast_vote(&voter, s, Some(Uuid::new_v4()), 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));

        let ok = fx.engine.cast_vote(&voter, s, Some(fx.request), 1).unwrap();
        assert_eq!(ok.new_state, VoteState::Up);
    }

    #[test]
    fn conflicting_insert_is_retried_as_update() {
        let fx = fixture();
        let voter = fx.user("bob");
        let s = fx.submission_by(&fx.user("carol"));

        // Another caller got its vote in after our lookup saw nothing
        fx.engine.cast_vote(&voter, s, None, -1).unwrap();

        let state = fx
            .engine
            .write(|conn| {
                apply_vote(
                    conn,
                    &s.to_string(),
                    &voter.id.to_string(),
                    VoteAction::Insert(VoteValue::Up),
                )
            })
            .unwrap();

        assert_eq!(state, VoteState::Up);
        assert_eq!(stored_vote(&fx, s, &voter), Some(1));
        assert_eq!(fx.engine.submission_score(s).unwrap(), 1);
    }

    #[test]
    fn concurrent_votes_keep_one_row_per_user() {
        let fx = fixture();
        let voter = fx.user("bob");
        let s = fx.submission_by(&fx.user("carol"));
        let engine = Arc::clone(&fx.engine);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                let voter = voter.clone();
                thread::spawn(move || {
                    let value = if i % 2 == 0 { 1 } else { -1 };
                    engine.cast_vote(&voter, s, None, value).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let score = engine.submission_score(s).unwrap();
        assert!((-1..=1).contains(&score));
        assert_eq!(fx.vote_rows(s), if score == 0 { 0 } else { 1 });
    }
}
