//! Error types for pm25-core.
//!
//! Every failure in this crate comes from talking to the prediction server.
//! None of them are fatal: the sync engine keeps the last good value for the
//! failing source and the chat session turns them into a user-facing reply.
//!
//! # Error Classification
//!
//! | Error Type | Class | Chat reply |
//! |------------|-------|------------|
//! | [`ApiError::Unreachable`] | Transport | [`crate::chat::UNREACHABLE_MESSAGE`] |
//! | [`ApiError::Timeout`] | Transport | [`crate::chat::UNREACHABLE_MESSAGE`] |
//! | [`ApiError::Api`] | Application | [`crate::chat::APOLOGY_MESSAGE`] |
//! | [`ApiError::Decode`] | Application | [`crate::chat::APOLOGY_MESSAGE`] |
//! | [`ApiError::InvalidPayload`] | Application | [`crate::chat::APOLOGY_MESSAGE`] |
//!
//! [`ApiError::InvalidUrl`] is only returned when constructing a client.

use std::time::Duration;

use thiserror::Error;

use pm25_types::ParseError;

/// Errors that can occur when talking to the prediction server.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The server could not be reached (connection refused, DNS, reset).
    #[error("Server not reachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The request did not complete in time.
    #[error("Request to {url} timed out after {duration:?}")]
    Timeout { url: String, duration: Duration },

    /// The server answered with an error payload.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected JSON shape.
    #[error("Malformed response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The response decoded but carried invalid values.
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Build an [`ApiError::Unreachable`] from a plain message.
    pub fn unreachable(url: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Unreachable {
            url: url.into(),
            source: Box::new(std::io::Error::other(message.into())),
        }
    }

    /// Whether the request never got an answer from the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Unreachable { .. } | ApiError::Timeout { .. })
    }
}

/// Result type alias using pm25-core's ApiError type.
pub type Result<T> = std::result::Result<T, ApiError>;
