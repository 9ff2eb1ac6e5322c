use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::{Context, bail};
use tracing::{info, warn};

use scout_core::{DEFAULT_WINNER_REPUTATION_AWARD, EngineConfig, MAX_WINNER_REPUTATION_AWARD};

const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub winner_reputation_award: i64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("SCOUT_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("SCOUT_JWT_SECRET is unset or still a placeholder");
        }

        let db_path: PathBuf = try_load(&lookup, "SCOUT_DB_PATH", "scout.db")?;
        let host: String = try_load(&lookup, "SCOUT_HOST", "0.0.0.0")?;
        let port: u16 = try_load(&lookup, "SCOUT_PORT", "3000")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

        let winner_reputation_award: i64 = try_load(
            &lookup,
            "SCOUT_WINNER_REPUTATION_AWARD",
            &DEFAULT_WINNER_REPUTATION_AWARD.to_string(),
        )?;
        if !(0..=MAX_WINNER_REPUTATION_AWARD).contains(&winner_reputation_award) {
            bail!(
                "SCOUT_WINNER_REPUTATION_AWARD must be between 0 and {}",
                MAX_WINNER_REPUTATION_AWARD
            );
        }

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            winner_reputation_award,
        })
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            winner_reputation_award: self.winner_reputation_award,
        }
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow::anyhow!("Invalid {key} value {raw:?}: {e}")
    })
}
