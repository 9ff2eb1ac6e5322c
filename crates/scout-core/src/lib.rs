//! Request–submission coordination engine.
//!
//! Every operation takes the acting user explicitly, validates input and
//! ownership, then applies its changes in a single store transaction.
//! Operations are synchronous; async callers should run them on a
//! blocking thread.

pub mod error;
pub mod identity;
pub mod ledger;

mod favorites;
mod moderation;
mod notifications;
mod profiles;
mod requests;
mod validate;
mod votes;

#[cfg(test)]
mod testutil;

use scout_db::{Database, DbConnection};

pub use error::{CoreError, Result};
pub use identity::{Actor, require_actor};
pub use requests::{NewRequest, NewSubmission, RequestDetail, RequestFilter};
pub use votes::VoteOutcome;

/// Reputation granted to a submission's author when it wins, unless configured.
pub const DEFAULT_WINNER_REPUTATION_AWARD: i64 = 10;
/// Largest award the server accepts from configuration.
pub const MAX_WINNER_REPUTATION_AWARD: i64 = 1_000_000;

pub const DEFAULT_LIST_LIMIT: u32 = 50;
pub const MAX_LIST_LIMIT: u32 = 200;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Added to the winning submission author's reputation. Never negative.
    pub winner_reputation_award: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            winner_reputation_award: DEFAULT_WINNER_REPUTATION_AWARD,
        }
    }
}

pub struct Engine {
    db: Database,
    config: EngineConfig,
}

impl Engine {
    pub fn new(db: Database, config: EngineConfig) -> Self {
        Self { db, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn read<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DbConnection) -> anyhow::Result<T>,
    {
        self.db.with_conn(f).map_err(CoreError::from_store)
    }

    fn write<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DbConnection) -> anyhow::Result<T>,
    {
        self.db.with_tx(f).map_err(CoreError::from_store)
    }
}

fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}
