//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::services::gateway::GatewayConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the JSON datastore files
    pub data_dir: PathBuf,

    /// Directory for rolling log files
    pub logs_dir: PathBuf,

    /// Records per bulk-create call
    pub batch_size: usize,

    /// Pause between consecutive dossier updates, in milliseconds
    pub update_delay_ms: u64,

    /// Attempts per rate-limited call before giving up
    pub retry_attempts: u32,

    /// Base retry pause, in milliseconds (attempt N waits N times this)
    pub retry_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let data_dir = std::env::var("RECOUVRO_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let logs_dir = std::env::var("RECOUVRO_LOGS_DIR")
            .unwrap_or_else(|_| "./logs".to_string())
            .into();

        let batch_size = env_parsed("RECOUVRO_BATCH_SIZE", 50)?;
        if batch_size == 0 {
            anyhow::bail!("RECOUVRO_BATCH_SIZE must be at least 1");
        }
        let update_delay_ms = env_parsed("RECOUVRO_UPDATE_DELAY_MS", 300)?;
        let retry_attempts = env_parsed("RECOUVRO_RETRY_ATTEMPTS", 3)?;
        let retry_delay_ms = env_parsed("RECOUVRO_RETRY_DELAY_MS", 1000)?;

        Ok(Self {
            data_dir,
            logs_dir,
            batch_size,
            update_delay_ms,
            retry_attempts,
            retry_delay_ms,
        })
    }

    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            batch_size: self.batch_size,
            update_delay: Duration::from_millis(self.update_delay_ms),
            retry_attempts: self.retry_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} is not a valid number: {raw}")),
        Err(_) => Ok(default),
    }
}
