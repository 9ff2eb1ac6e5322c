use tracing::{debug, warn};
use uuid::Uuid;

use scout_db::{DbConnection, is_unique_violation, queries};
use scout_types::models::Request;

use crate::error::{CoreError, Result};
use crate::identity::Actor;
use crate::ledger::{FavoriteAction, decide_favorite};
use crate::Engine;

impl Engine {
    /// Bookmark or un-bookmark a request. Returns whether it is now a favorite.
    pub fn toggle_favorite(&self, actor: &Actor, request_id: Uuid) -> Result<bool> {
        let rid = request_id.to_string();
        let uid = actor.id.to_string();

        let is_favorite = self.write(|conn| {
            queries::get_request(conn, &rid)?
                .ok_or_else(|| CoreError::invalid_argument("Request does not exist"))?;

            let exists = queries::get_favorite_id(conn, &rid, &uid)?.is_some();
            apply_favorite(conn, &rid, &uid, decide_favorite(exists))
        })?;

        debug!("Favorite by {} on {}: {}", actor.id, request_id, is_favorite);
        Ok(is_favorite)
    }

    /// Requests the actor has favorited, most recent first.
    pub fn list_favorites(&self, actor: &Actor) -> Result<Vec<Request>> {
        let uid = actor.id.to_string();
        self.read(|conn| {
            queries::list_favorite_requests(conn, &uid)?
                .into_iter()
                .map(|row| row.into_model())
                .collect()
        })
    }
}

/// A conflicting insert means the favorite already exists, which is the
/// state the caller asked for.
pub(crate) fn apply_favorite(
    conn: &DbConnection,
    request_id: &str,
    user_id: &str,
    action: FavoriteAction,
) -> anyhow::Result<bool> {
    match action {
        FavoriteAction::Insert => {
            let id = Uuid::new_v4().to_string();
            match queries::insert_favorite(conn, &id, request_id, user_id) {
                Ok(()) => {}
                Err(e) if is_unique_violation(&e) => {
                    warn!(
                        "Duplicate favorite insert for ({}, {}), keeping existing row",
                        request_id, user_id
                    );
                }
                Err(e) => return Err(e),
            }
        }
        FavoriteAction::Delete => {
            queries::delete_favorite(conn, request_id, user_id)?;
        }
    }

    Ok(action.is_favorite())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::testutil::fixture;

    #[test]
    fn toggles_on_and_off() {
        let fx = fixture();
        let user = fx.user("bob");

        assert!(fx.engine.toggle_favorite(&user, fx.request).unwrap());
        assert_eq!(fx.engine.list_favorites(&user).unwrap().len(), 1);

        assert!(!fx.engine.toggle_favorite(&user, fx.request).unwrap());
        assert!(fx.engine.list_favorites(&user).unwrap().is_empty());
    }

    #[test]
    fn unknown_request_is_invalid_argument() {
        let fx = fixture();
        let err = fx
            .engine
            .toggle_favorite(&fx.user("bob"), Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn conflicting_insert_keeps_single_row() {
        let fx = fixture();
        let user = fx.user("bob");
        fx.engine.toggle_favorite(&user, fx.request).unwrap();

        let is_favorite = fx
            .engine
            .write(|conn| {
                apply_favorite(
                    conn,
                    &fx.request.to_string(),
                    &user.id.to_string(),
                    FavoriteAction::Insert,
                )
            })
            .unwrap();

        assert!(is_favorite);
        assert_eq!(fx.engine.list_favorites(&user).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_toggles_keep_one_row() {
        let fx = fixture();
        let user = fx.user("bob");
        let request = fx.request;

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let engine = Arc::clone(&fx.engine);
                let user = user.clone();
                thread::spawn(move || engine.toggle_favorite(&user, request).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // An even number of toggles lands back where it started
        assert!(fx.engine.list_favorites(&user).unwrap().is_empty());
    }
}
