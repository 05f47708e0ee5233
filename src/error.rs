//! Library error type

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing or invalid. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The database does not have the layout the hook/chat loggers write.
    #[error("unexpected database layout in {path}: {message}")]
    Schema { path: PathBuf, message: String },

    #[error("record store error: {0}")]
    Store(#[from] rusqlite::Error),
}
