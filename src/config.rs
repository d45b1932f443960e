//! Service configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT `{0}`")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    /// JSON array of stored records loaded at startup.
    pub seed_file: Option<PathBuf>,
}

impl ServiceConfig {
    /// Build typed service config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3001
    /// - `TACMAP_SEED_FILE`: no seed when absent or empty
    ///
    /// # Errors
    ///
    /// Returns `InvalidPort` when `PORT` is set but not a port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };
        let seed_file = std::env::var("TACMAP_SEED_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self { port, seed_file })
    }
}
