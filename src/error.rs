use std::sync::Arc;
use thiserror::Error;

/// Main error type for Infogram API operations
#[derive(Debug, Error)]
pub enum InfogramError {
    /// A parameter could not be percent-encoded or decoded
    #[error("parameter encoding failed: {0}")]
    Encoding(String),

    /// Signature computation failed (bad secret, digest failure)
    #[error("request signing failed: {0}")]
    Signing(String),

    /// The network exchange itself failed (DNS, TCP, TLS).
    ///
    /// Captured when the exchange happens and re-raised when status or body
    /// is first accessed, hence the shared handle.
    #[error("connection failed: {0}")]
    Connection(#[source] Arc<reqwest::Error>),

    /// HTTP verb outside GET, POST, PUT and DELETE
    #[error("unsupported request method: {0}")]
    UnsupportedMethod(String),

    /// Unknown response shape name
    #[error("unsupported response shape: {0}")]
    UnsupportedShape(String),

    /// A response was unwrapped as a shape it was not built with
    #[error("expected a {expected} response, got {actual}")]
    UnexpectedShape {
        expected: &'static str,
        actual: &'static str,
    },

    /// The body stream was already handed out or drained by another accessor
    #[error("response stream already consumed")]
    StreamConsumed,

    /// HTTP client error outside of the exchange (building a client or request)
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while reading a body
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or credentials
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A submitted task could not be joined
    #[error("request task failed: {0}")]
    Task(String),
}

impl InfogramError {
    /// Check if this error came from the network exchange itself
    pub fn is_connection(&self) -> bool {
        matches!(self, InfogramError::Connection(_))
    }

    /// Check if this error is a body reentry violation
    pub fn is_stream_consumed(&self) -> bool {
        matches!(self, InfogramError::StreamConsumed)
    }

    /// Check if this error is a programmer error in the calling layer
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            InfogramError::UnsupportedMethod(_)
                | InfogramError::UnsupportedShape(_)
                | InfogramError::UnexpectedShape { .. }
                | InfogramError::StreamConsumed
        )
    }
}

/// Result type for Infogram operations
pub type Result<T> = std::result::Result<T, InfogramError>;
