//! Service configuration from environment variables.

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "./data/duels";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("DUEL_STORE must be \"memory\" or \"file\", got {0:?}")]
    UnknownStore(String),
}

/// Where duel records live
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub store: StoreBackend,
}

impl ServerConfig {
    /// Read `PORT`, `DUEL_STORE` and `DUEL_DATA_DIR`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let store = match lookup("DUEL_STORE").as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("file") => StoreBackend::File(
                lookup("DUEL_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            ),
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        Ok(Self { port, store })
    }
}
