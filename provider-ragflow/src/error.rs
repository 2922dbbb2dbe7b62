//! Error types for the RAGFlow provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// RAGFlow provider errors
#[derive(Error, Debug)]
pub enum RagflowError {
    /// The envelope carried a non-zero `code`
    #[error("RAGFlow API error (code {code}): {message}")]
    ApiError { code: i64, message: String },

    /// The server answered with a non-2xx status
    #[error("RAGFlow returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The envelope was well formed but had no usable `data`
    #[error("Response is missing {0}")]
    MissingData(&'static str),

    /// Local file could not be read for upload
    #[error("Cannot read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Result type for RAGFlow operations
pub type Result<T> = std::result::Result<T, RagflowError>;

impl RagflowError {
    /// Whether a read may succeed on another attempt inside a bounded loop.
    ///
    /// Any rejected or malformed response qualifies; only local failures and
    /// an unavailable transport do not.
    pub fn is_retryable(&self) -> bool {
        match self {
            RagflowError::HttpStatus { .. }
            | RagflowError::ApiError { .. }
            | RagflowError::ParseError(_)
            | RagflowError::MissingData(_) => true,
            RagflowError::Bridge(e) => e.is_retryable(),
            RagflowError::ReadFailed { .. } => false,
        }
    }
}

impl From<RagflowError> for BridgeError {
    fn from(error: RagflowError) -> Self {
        match error {
            RagflowError::HttpStatus { status, body } if status == 429 || status >= 500 => {
                BridgeError::Transport(format!("HTTP {}: {}", status, body))
            }
            RagflowError::HttpStatus { status, body } => {
                BridgeError::Protocol(format!("HTTP {}: {}", status, body))
            }
            RagflowError::ApiError { code, message } => {
                BridgeError::Protocol(format!("API error (code {}): {}", code, message))
            }
            RagflowError::ParseError(msg) => {
                BridgeError::Protocol(format!("Parse error: {}", msg))
            }
            RagflowError::MissingData(what) => {
                BridgeError::Protocol(format!("Response is missing {}", what))
            }
            RagflowError::ReadFailed { source, .. } => BridgeError::Io(source),
            RagflowError::Bridge(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = RagflowError::ApiError {
            code: 102,
            message: "You don't own the dataset".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "RAGFlow API error (code 102): You don't own the dataset"
        );
    }

    #[test]
    fn test_server_errors_become_transport() {
        let error = RagflowError::HttpStatus {
            status: 503,
            body: "busy".to_string(),
        };
        assert!(error.is_retryable());

        let bridge_error: BridgeError = error.into();
        assert!(matches!(bridge_error, BridgeError::Transport(_)));
    }

    #[test]
    fn test_client_errors_become_protocol() {
        let error = RagflowError::HttpStatus {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert!(error.is_retryable());

        let bridge_error: BridgeError = error.into();
        assert!(matches!(bridge_error, BridgeError::Protocol(_)));
    }

    #[test]
    fn test_api_error_is_retryable() {
        let error = RagflowError::ApiError {
            code: 101,
            message: "bad request".to_string(),
        };
        assert!(error.is_retryable());
    }

    #[test]
    fn test_local_read_failure_not_retryable() {
        let error = RagflowError::ReadFailed {
            path: "/docs/missing.md".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(!error.is_retryable());
        assert!(!RagflowError::Bridge(BridgeError::NotAvailable("offline".to_string())).is_retryable());
    }
}
