use tracing::info;
use uuid::Uuid;

use scout_db::{DbConnection, queries};
use scout_types::models::Notification;
use scout_types::notifications::NotificationPayload;

use crate::error::{CoreError, Result};
use crate::identity::Actor;
use crate::{Engine, clamp_limit};

impl Engine {
    /// Record an unread notification for `recipient_id`.
    pub fn notify(&self, recipient_id: Uuid, payload: &NotificationPayload) -> Result<Uuid> {
        self.write(|conn| enqueue(conn, recipient_id, payload))
    }

    /// Mark one of the actor's own notifications as read.
    pub fn mark_notification_read(&self, actor: &Actor, notification_id: Uuid) -> Result<()> {
        let nid = notification_id.to_string();
        let uid = actor.id.to_string();

        self.write(|conn| {
            let row = queries::get_notification(conn, &nid)?
                .ok_or(CoreError::NotFound("Notification"))?;
            if row.recipient_id != uid {
                return Err(CoreError::forbidden("This notification is not yours").into());
            }
            queries::mark_notification_read(conn, &nid)?;
            Ok(())
        })
    }

    /// Mark every unread notification of the actor as read.
    /// Returns how many changed.
    pub fn mark_all_notifications_read(&self, actor: &Actor) -> Result<usize> {
        let uid = actor.id.to_string();
        let updated = self.write(|conn| queries::mark_all_notifications_read(conn, &uid))?;
        info!("Marked {} notifications read for {}", updated, actor.id);
        Ok(updated)
    }

    /// Newest first.
    pub fn list_notifications(
        &self,
        actor: &Actor,
        unread_only: bool,
        limit: Option<u32>,
    ) -> Result<Vec<Notification>> {
        let uid = actor.id.to_string();
        let limit = clamp_limit(limit);
        self.read(|conn| {
            queries::list_notifications(conn, &uid, unread_only, limit)?
                .into_iter()
                .map(|row| row.into_model())
                .collect()
        })
    }

    pub fn unread_notification_count(&self, actor: &Actor) -> Result<u64> {
        let uid = actor.id.to_string();
        self.read(|conn| queries::count_unread_notifications(conn, &uid))
    }
}

/// Insert a notification inside the caller's transaction.
pub(crate) fn enqueue(
    conn: &DbConnection,
    recipient_id: Uuid,
    payload: &NotificationPayload,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    let body = serde_json::to_string(payload)?;
    queries::insert_notification(conn, &id.to_string(), &recipient_id.to_string(), &body)?;
    Ok(id)
}
