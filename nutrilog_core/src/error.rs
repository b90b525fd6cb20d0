//! Error types for the nutrilog_core library.

use std::io;

use crate::parser::ParseError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Fixed user-facing message for malformed webhook text
pub const INVALID_MESSAGE_FORMAT: &str =
    "Invalid message format. Expected: 'log [meal_type]: [food_items]'";

/// Core error type for nutrilog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller-correctable input problem (bad gender, meal type, date, ...)
    #[error("{0}")]
    Validation(String),

    /// Webhook text did not match `log <meal_type>: <items>`
    #[error("Invalid message format. Expected: 'log [meal_type]: [food_items]'")]
    InvalidMessage(#[from] ParseError),

    /// Referenced user or meal does not exist
    #[error("{0}")]
    NotFound(String),

    /// Invariant violation inside the core
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Coarse classification used by transports to pick a response status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::InvalidMessage(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Internal(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Toml(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-style status code for this error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::Validation("x".into()).status_code(), 400);
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
        assert_eq!(Error::Internal("x".into()).status_code(), 500);
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_invalid_message_uses_fixed_text() {
        let err = Error::from(ParseError::MissingKeyword);
        assert_eq!(err.to_string(), INVALID_MESSAGE_FORMAT);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
