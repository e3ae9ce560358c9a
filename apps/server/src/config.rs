use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_PATH: &str = "./db/catalog.db";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Top of every hour
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Catalog sync cadence; runs are aligned to wall-clock multiples of it
    pub sync_interval: Duration,
}

impl Config {
    /// Reads `SHELFSYNC_*` variables, loading `.env` first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("SHELFSYNC_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("Invalid SHELFSYNC_LISTEN_ADDR")?;
        let db_path = lookup("SHELFSYNC_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into());
        let cors_allow = lookup("SHELFSYNC_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = lookup("SHELFSYNC_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
        let sync_interval_secs: u64 = match lookup("SHELFSYNC_SYNC_INTERVAL_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .context("Invalid SHELFSYNC_SYNC_INTERVAL_SECS")?,
            None => DEFAULT_SYNC_INTERVAL_SECS,
        };
        if sync_interval_secs == 0 {
            anyhow::bail!("SHELFSYNC_SYNC_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            sync_interval: Duration::from_secs(sync_interval_secs),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: DEFAULT_DB_PATH.to_string(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
        }
    }
}
