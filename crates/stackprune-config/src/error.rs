use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error("Invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("Resource TTL must be positive, got {0:?}")]
    NonPositiveTtl(String),

    #[error("Unknown resource type {0:?}, expected one of: {1}")]
    UnknownKind(String, String),

    #[error("Resource type {0:?} is both included and excluded")]
    ConflictingKind(String),

    #[error("Ignore file not found: {0}")]
    IgnoreFileNotFound(PathBuf),

    #[error("Failed to parse ignore file {path}: {source}")]
    IgnoreFileParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid ignore file {path}: {source}")]
    IgnoreFileInvalid {
        path: PathBuf,
        #[source]
        source: stackprune_cloud::CloudError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
