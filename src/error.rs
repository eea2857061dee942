//! Client error types and retry classification.

use std::time::Duration;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client errors.
///
/// The variants fall into two classes as far as the execute strategy is
/// concerned: usage/logic/semantic failures that are never retried
/// ([`InvalidArgument`](Self::InvalidArgument), [`Unsupported`](Self::Unsupported),
/// [`Unimplemented`](Self::Unimplemented), [`Http`](Self::Http)) and everything
/// else, which is retryable up to the configured budget. An
/// [`Aggregate`](Self::Aggregate) is retryable only when every flattened leaf is.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A caller supplied an invalid or missing argument.
    #[error("invalid argument `{param}`: {message}")]
    InvalidArgument {
        /// Name of the offending parameter.
        param: &'static str,
        /// Why the argument was rejected.
        message: String,
    },

    /// The requested operation is not supported.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// The requested operation is not implemented.
    #[error("operation not implemented: {0}")]
    Unimplemented(String),

    /// Semantic HTTP failure: the server answered with a non-success status.
    #[error("HTTP error: {status} - {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// Request timed out.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// Underlying transport error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Container failure wrapping the errors of a fan-out execution.
    #[error("aggregate failure with {} nested errors", .0.len())]
    Aggregate(Vec<ClientError>),

    /// The execution was cancelled before completing.
    #[error("operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// Shorthand for an [`InvalidArgument`](Self::InvalidArgument) error.
    pub fn invalid_argument(param: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            param,
            message: message.into(),
        }
    }

    /// Check if this error is retryable under the default policy.
    ///
    /// Usage, logic, and semantic HTTP errors are terminal; an aggregate is
    /// retryable only if every recursively flattened leaf is. Everything else,
    /// notably transport and connectivity failures, is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidArgument { .. }
            | Self::Unsupported(_)
            | Self::Unimplemented(_)
            | Self::Http { .. }
            | Self::Cancelled => false,
            Self::Aggregate(_) => self.flatten().iter().all(|e| e.is_retryable()),
            _ => true,
        }
    }

    /// Recursively flatten nested aggregates into their leaf errors.
    ///
    /// A non-aggregate error flattens to itself.
    pub fn flatten(&self) -> Vec<&ClientError> {
        fn walk<'a>(error: &'a ClientError, leaves: &mut Vec<&'a ClientError>) {
            match error {
                ClientError::Aggregate(inner) => {
                    for nested in inner {
                        walk(nested, leaves);
                    }
                }
                leaf => leaves.push(leaf),
            }
        }

        let mut leaves = Vec::new();
        walk(self, &mut leaves);
        leaves
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_)) || matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_)) || matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// Get the HTTP status code if this is a semantic HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> ClientError {
        ClientError::Connection("refused".into())
    }

    #[test]
    fn test_usage_errors_not_retryable() {
        assert!(!ClientError::invalid_argument("action", "missing").is_retryable());
        assert!(!ClientError::Unsupported("PATCH".into()).is_retryable());
        assert!(!ClientError::Unimplemented("streaming".into()).is_retryable());
        assert!(
            !ClientError::Http {
                status: 404,
                message: "not found".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_transient_errors_retryable() {
        assert!(connection().is_retryable());
        assert!(ClientError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ClientError::Json("truncated".into()).is_retryable());
    }

    #[test]
    fn test_aggregate_all_retryable() {
        let error = ClientError::Aggregate(vec![
            connection(),
            ClientError::Timeout(Duration::from_secs(1)),
        ]);
        assert!(error.is_retryable());
    }

    #[test]
    fn test_aggregate_with_terminal_leaf() {
        let error = ClientError::Aggregate(vec![
            connection(),
            ClientError::Http {
                status: 400,
                message: "bad request".into(),
            },
        ]);
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_nested_aggregate_flattening() {
        let error = ClientError::Aggregate(vec![
            connection(),
            ClientError::Aggregate(vec![
                ClientError::Aggregate(vec![ClientError::invalid_argument("id", "empty")]),
                connection(),
            ]),
        ]);

        let leaves = error.flatten();
        assert_eq!(leaves.len(), 3);
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_flatten_of_leaf_is_itself() {
        let error = connection();
        let leaves = error.flatten();
        assert_eq!(leaves.len(), 1);
        assert!(matches!(leaves[0], ClientError::Connection(_)));
    }

    #[test]
    fn test_status_code() {
        let error = ClientError::Http {
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(error.status_code(), Some(503));
        assert_eq!(connection().status_code(), None);
    }
}
