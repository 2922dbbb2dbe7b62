use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Network-layer failure (connect, timeout, retryable HTTP status)
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The remote answered, but not in the shape or with the status we expected
    #[error("Protocol failure: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether a bounded retry may reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::Transport(_) | BridgeError::Protocol(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
