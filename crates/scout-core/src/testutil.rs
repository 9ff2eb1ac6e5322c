//! Shared fixtures for the engine's unit tests.

use std::sync::Arc;

use uuid::Uuid;

use scout_db::{Database, queries};

use crate::identity::Actor;
use crate::requests::{NewRequest, NewSubmission};
use crate::{Engine, EngineConfig};

pub struct Fixture {
    pub engine: Arc<Engine>,
    /// Author of `request`.
    pub author: Actor,
    /// An open request.
    pub request: Uuid,
}

pub fn fixture() -> Fixture {
    fixture_with(EngineConfig::default())
}

pub fn fixture_with(config: EngineConfig) -> Fixture {
    let db = Database::open_in_memory().unwrap();
    let engine = Arc::new(Engine::new(db, config));

    let author = Actor::new(Uuid::new_v4()).with_email("author@example.com");
    engine.get_or_create_profile(&author).unwrap();

    let mut fx = Fixture {
        engine,
        author,
        request: Uuid::nil(),
    };
    fx.request = fx.request_by(&fx.author);
    fx
}

impl Fixture {
    /// A fresh user with a profile.
    pub fn user(&self, name: &str) -> Actor {
        let actor = Actor::new(Uuid::new_v4()).with_email(format!("{}@example.com", name));
        self.engine.get_or_create_profile(&actor).unwrap();
        actor
    }

    pub fn request_by(&self, author: &Actor) -> Uuid {
        self.engine
            .create_request(
                author,
                NewRequest {
                    title: "Ergonomic office chair".into(),
                    category: "furniture".into(),
                    description: None,
                },
            )
            .unwrap()
            .id
    }

    /// A submission on the fixture's request.
    pub fn submission_by(&self, author: &Actor) -> Uuid {
        self.submission_on(self.request, author)
    }

    pub fn submission_on(&self, request: Uuid, author: &Actor) -> Uuid {
        self.engine
            .create_submission(
                author,
                request,
                NewSubmission {
                    link: "https://shop.example/chair".into(),
                    price_cents: Some(18900),
                    ..Default::default()
                },
            )
            .unwrap()
    }

    pub fn reputation(&self, actor: &Actor) -> i64 {
        self.engine.get_profile(actor.id).unwrap().reputation
    }

    /// Stored vote value for `(submission, user)`, if any.
    pub fn db_vote(&self, submission: Uuid, user: Uuid) -> Option<i64> {
        self.engine
            .db
            .with_conn(|conn| queries::get_vote(conn, &submission.to_string(), &user.to_string()))
            .unwrap()
            .map(|row| row.value)
    }

    pub fn vote_rows(&self, submission: Uuid) -> i64 {
        self.engine
            .db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM votes WHERE submission_id = ?1",
                    [submission.to_string()],
                    |r| r.get(0),
                )?)
            })
            .unwrap()
    }
}
