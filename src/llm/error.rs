//! Typed errors for provider calls
//!
//! Provides structured error types so callers can distinguish failure modes
//! (auth, rate limiting, timeout, ...) without string matching.

use thiserror::Error;

/// Failure of a `ResponseSource::generate` call
///
/// Variants carry plain strings so the error can be cloned into comparison
/// reports and rendered in the dashboard.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Missing, expired or invalid credentials (HTTP 401/403 or key not set)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Malformed request (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Server-side error (HTTP 5xx)
    #[error("Service error: {0}")]
    ServiceError(String),

    /// Connection refused, DNS failure and similar
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the configured request timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Request aborted by the user
    #[error("Request cancelled by user")]
    Cancelled,

    /// Provider answered with a body we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Check if this error is retryable (after a delay or auth refresh)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited(_)
                | ProviderError::ServiceError(_)
                | ProviderError::Network(_)
                | ProviderError::Timeout(_)
        )
    }

    /// Convert HTTP status code and error text into a typed error
    pub fn from_http_status(status: reqwest::StatusCode, error_text: String) -> Self {
        match status.as_u16() {
            401 | 403 => ProviderError::Unauthorized(error_text),
            429 => ProviderError::RateLimited(error_text),
            400 => ProviderError::BadRequest(error_text),
            500..=599 => ProviderError::ServiceError(error_text),
            _ => ProviderError::Other(format!("HTTP {}: {}", status, error_text)),
        }
    }

    /// Convert network/connection errors into a typed error
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            ProviderError::Network(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            ProviderError::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            Self::from_http_status(status, e.to_string())
        } else {
            ProviderError::Other(e.to_string())
        }
    }
}
