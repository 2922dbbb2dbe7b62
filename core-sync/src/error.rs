use bridge_traits::error::BridgeError;
use bridge_traits::storage::ExtractError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to persist sync state to {path}: {reason}")]
    StatePersistence { path: PathBuf, reason: String },

    #[error("Dataset '{name}' is unavailable: {reason}")]
    DatasetUnavailable { name: String, reason: String },

    #[error("File discovery failed: {0}")]
    Discovery(String),

    #[error("Remote store error: {0}")]
    Remote(#[from] BridgeError),

    #[error("Upload response unusable: {0}")]
    Extract(#[from] ExtractError),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Sync cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SyncError>;
