use tracing::info;
use uuid::Uuid;

use scout_db::queries;
use scout_types::models::{Report, ReportTarget};

use crate::error::{CoreError, Result};
use crate::identity::Actor;
use crate::validate::MAX_REASON_LEN;
use crate::Engine;

impl Engine {
    /// Record an abuse report for later human review. Nothing else happens
    /// to the reported content.
    pub fn file_report(
        &self,
        actor: &Actor,
        target_type: &str,
        target_id: Uuid,
        reason: &str,
    ) -> Result<Uuid> {
        let target: ReportTarget = target_type
            .parse()
            .map_err(|_| CoreError::invalid_argument("Target type must be request or submission"))?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CoreError::invalid_argument("A reason is required"));
        }
        if reason.chars().count() > MAX_REASON_LEN {
            return Err(CoreError::invalid_argument(format!(
                "Reason must be at most {} characters",
                MAX_REASON_LEN
            )));
        }

        let report_id = Uuid::new_v4();
        let tid = target_id.to_string();

        self.write(|conn| {
            let exists = match target {
                ReportTarget::Request => queries::get_request(conn, &tid)?.is_some(),
                ReportTarget::Submission => queries::get_submission(conn, &tid)?.is_some(),
            };
            if !exists {
                return Err(CoreError::invalid_argument(format!(
                    "Reported {} does not exist",
                    target.as_str()
                ))
                .into());
            }

            queries::insert_report(
                conn,
                &report_id.to_string(),
                &actor.id.to_string(),
                target.as_str(),
                &tid,
                reason,
            )
        })?;

        info!("Report {} filed by {} against {} {}", report_id, actor.id, target.as_str(), target_id);
        Ok(report_id)
    }

    /// Reports against one piece of content, oldest first. For reviewers.
    pub fn reports_for(&self, target: ReportTarget, target_id: Uuid) -> Result<Vec<Report>> {
        let tid = target_id.to_string();
        self.read(|conn| {
            queries::list_reports_for_target(conn, target.as_str(), &tid)?
                .into_iter()
                .map(|row| row.into_model())
                .collect()
        })
    }
}
