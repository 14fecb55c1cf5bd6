use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed bestlist: {0}")]
    ScrapeError(String),

    #[error("Results are not monotonically {0}")]
    SanityCheckFailed(&'static str),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Score list error: {0}")]
    ScoreListError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl SyncError {
    pub fn sanity_check_failed(ascending: bool) -> Self {
        SyncError::SanityCheckFailed(if ascending { "increasing" } else { "decreasing" })
    }

    /// Errors worth retrying: the remote side or the database was unreachable.
    pub fn is_connectivity(&self) -> bool {
        match self {
            SyncError::RequestError(e) => e.is_connect() || e.is_timeout(),
            SyncError::StorageError(e) => e.is_connection_error(),
            SyncError::ConnectionError(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynchronizationErrorKind {
    ConnectionLost,
    Unknown,
}

impl fmt::Display for SynchronizationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynchronizationErrorKind::ConnectionLost => write!(f, "connection lost"),
            SynchronizationErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// What the batch driver sees when a discipline could not be synchronized.
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct SynchronizationError {
    pub kind: SynchronizationErrorKind,
    pub message: String,
}

impl SynchronizationError {
    pub fn connection_lost(message: impl Into<String>) -> Self {
        Self {
            kind: SynchronizationErrorKind::ConnectionLost,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            kind: SynchronizationErrorKind::Unknown,
            message: message.into(),
        }
    }

    pub fn is_connection_lost(&self) -> bool {
        self.kind == SynchronizationErrorKind::ConnectionLost
    }
}
