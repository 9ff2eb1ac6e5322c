use tracing::{error, info};
use uuid::Uuid;

use scout_db::queries;
use scout_types::models::Profile;

use crate::error::{CoreError, Result};
use crate::identity::Actor;
use crate::Engine;

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 24;
/// Tries before giving up on finding a free username.
const MAX_USERNAME_ATTEMPTS: usize = 5;

impl Engine {
    /// Return the actor's profile, creating it on first sight.
    ///
    /// Two first visits racing each other both end up reading the same row:
    /// the insert skips on conflict and the read happens afterwards.
    pub fn get_or_create_profile(&self, actor: &Actor) -> Result<Profile> {
        let id = actor.id.to_string();

        if let Some(row) = self.read(|conn| queries::get_profile(conn, &id))? {
            return row.into_model().map_err(CoreError::from_store);
        }

        let base = derive_username(actor.email.as_deref());
        let mut candidate = base.clone();

        for _ in 0..MAX_USERNAME_ATTEMPTS {
            let row = self.write(|conn| {
                let created = queries::insert_profile_if_absent(conn, &id, &candidate, &candidate)?;
                Ok((created, queries::get_profile(conn, &id)?))
            })?;

            match row {
                (created, Some(row)) => {
                    if created {
                        info!("Created profile {} ({})", actor.id, row.username);
                    }
                    return row.into_model().map_err(CoreError::from_store);
                }
                // Username already taken by someone else
                (_, None) => candidate = with_suffix(&base),
            }
        }

        error!("No free username for {} after {} attempts", actor.id, MAX_USERNAME_ATTEMPTS);
        Err(CoreError::StoreFailure)
    }

    pub fn get_profile(&self, user_id: Uuid) -> Result<Profile> {
        let id = user_id.to_string();
        self.read(|conn| {
            queries::get_profile(conn, &id)?
                .ok_or(CoreError::NotFound("Profile"))?
                .into_model()
        })
    }
}

/// Username from the email local part, or a random one when there is
/// nothing usable.
fn derive_username(email: Option<&str>) -> String {
    let local = email
        .and_then(|e| e.split('@').next())
        .unwrap_or_default();

    let mut name = String::with_capacity(local.len());
    for c in local.chars() {
        match c {
            'a'..='z' | '0'..='9' => name.push(c),
            'A'..='Z' => name.push(c.to_ascii_lowercase()),
            '.' | '-' | '_' | '+' if !name.is_empty() && !name.ends_with('_') => name.push('_'),
            _ => {}
        }
        if name.len() == MAX_USERNAME_LEN {
            break;
        }
    }
    let name = name.trim_end_matches('_');

    if name.len() < MIN_USERNAME_LEN {
        format!("user_{}", random_suffix())
    } else {
        name.to_string()
    }
}

fn with_suffix(base: &str) -> String {
    // 8 hex chars plus the separator
    let keep = MAX_USERNAME_LEN - 9;
    let prefix: String = base.chars().take(keep).collect();
    format!("{}_{}", prefix.trim_end_matches('_'), random_suffix())
}

fn random_suffix() -> String {
    format!("{:08x}", rand::random::<u32>())
}
