use thiserror::Error;

/// Errors that can occur while invoking an LLM provider.
///
/// The evaluation engine treats every variant as opaque: a failed call
/// becomes an unknown-labeled result, never an aborted run. Only
/// [`ProviderError::Configuration`] is raised before any call is made.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Missing credentials, unknown provider type, or an invalid setting
    #[error("Invalid provider configuration: {0}")]
    Configuration(String),

    /// Transport-level failure (connection refused, DNS, TLS, body decode)
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request timed out
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// The response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The response carried no text
    #[error("No content in response")]
    NoContent,

    /// Other provider error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Map a transport error, keeping timeouts distinguishable.
    pub fn from_transport(error: reqwest::Error, timeout_ms: u64) -> Self {
        if error.is_timeout() {
            return ProviderError::Timeout(timeout_ms);
        }
        ProviderError::Http(error)
    }

    /// Map a non-success HTTP status and its body.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 {
            return ProviderError::RateLimit(body);
        }
        ProviderError::Status { status, body }
    }

    /// Check if this error is retryable.
    ///
    /// Returns `true` for transient errors that might succeed on retry:
    /// - Transport failures and timeouts
    /// - Rate limits
    /// - Server-side (5xx) statuses
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Http(_) => true,
            ProviderError::Timeout(_) => true,
            ProviderError::RateLimit(_) => true,
            ProviderError::Status { status, .. } => *status >= 500,
            ProviderError::Configuration(_) => false,
            ProviderError::InvalidResponse(_) => false,
            ProviderError::NoContent => false,
            ProviderError::Other(_) => false,
        }
    }

    /// Check if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ProviderError::Configuration(_))
    }
}
