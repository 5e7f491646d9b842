//! Error types for the catalog client.

use thiserror::Error;

use crate::retry::Retryable;

/// Errors that can occur when interacting with the catalog backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status.
    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    /// Session bootstrap returned no session token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A configured value cannot be sent as an HTTP header.
    #[error("Invalid header value for {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// HTTP status code, if the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Retryable for ApiError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }

    fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}
