//! Error types for the crypto market table

use thiserror::Error;

/// Errors that can occur when fetching market data from a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Body was not JSON or did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Provider API error (non-success status)
    #[error("Provider API error: {0}")]
    ApiError(String),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,
}

impl ProviderError {
    /// Classifies a reqwest error, separating timeouts from other transport failures
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::NetworkError(err)
        }
    }
}

/// Errors returned by table operations
///
/// Fetch failures are not reported here; they are logged and kept in
/// [`LoadState::Failed`](crate::types::LoadState::Failed).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// `initialize` was already called on this table
    #[error("Table is already initialized")]
    AlreadyInitialized,

    /// The table was torn down
    #[error("Table has been torn down")]
    TornDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ProviderError::ApiError("HTTP 500".to_string()).to_string(),
            "Provider API error: HTTP 500"
        );
        assert_eq!(ProviderError::RateLimitExceeded.to_string(), "Rate limit exceeded");
        assert_eq!(TableError::TornDown.to_string(), "Table has been torn down");
    }
}
