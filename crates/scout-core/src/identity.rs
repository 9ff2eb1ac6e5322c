use uuid::Uuid;

use scout_types::api::Claims;

use crate::error::{CoreError, Result};

/// The authenticated user an operation acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub email: Option<String>,
}

impl Actor {
    pub fn new(id: Uuid) -> Self {
        Self { id, email: None }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Resolve the acting user from verified identity-provider claims.
/// No claims (or a nil subject) means the caller is not signed in.
pub fn require_actor(claims: Option<&Claims>) -> Result<Actor> {
    let claims = claims.ok_or(CoreError::Unauthorized)?;
    if claims.sub.is_nil() {
        return Err(CoreError::Unauthorized);
    }

    Ok(Actor {
        id: claims.sub,
        email: claims.email.clone().filter(|e| !e.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_claims_are_unauthorized() {
        assert!(matches!(require_actor(None), Err(CoreError::Unauthorized)));

        let nil = Claims {
            sub: Uuid::nil(),
            email: None,
            exp: 0,
        };
        assert!(matches!(require_actor(Some(&nil)), Err(CoreError::Unauthorized)));
    }

    #[test]
    fn claims_resolve_to_actor() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id,
            email: Some("  ".into()),
            exp: 0,
        };
        let actor = require_actor(Some(&claims)).unwrap();
        assert_eq!(actor.id, id);
        assert_eq!(actor.email, None);
    }
}
