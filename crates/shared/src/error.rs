use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed is closed; cannot subscribe to '{path}'")]
    Closed { path: String },
    #[error("invalid feed path '{path}'")]
    InvalidPath { path: String },
}
