//! Error types for payload validation in pm25-types.

use thiserror::Error;

/// Errors that can occur when validating data received from the server.
///
/// This error type is transport-agnostic and does not include HTTP errors
/// (those belong in pm25-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A timestamp string did not match any accepted format.
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    /// A concentration value was NaN or infinite.
    #[error("Invalid value for {field}: {value} is not a finite number")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Result type alias using pm25-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
