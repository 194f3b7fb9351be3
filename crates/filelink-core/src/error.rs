//! Error types for filelink.

use thiserror::Error;

/// Result type alias using filelink's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for filelink operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record not found by id
    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    /// Record store operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// Work queue error
    #[error("Queue error: {0}")]
    Queue(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("work item".to_string());
        assert_eq!(err.to_string(), "Not found: work item");
    }

    #[test]
    fn test_error_display_record_not_found() {
        let err = Error::RecordNotFound(42);
        assert_eq!(err.to_string(), "Record not found: 42");
    }

    #[test]
    fn test_error_display_store() {
        let err = Error::Store("persist rejected".to_string());
        assert_eq!(err.to_string(), "Store error: persist rejected");
    }

    #[test]
    fn test_error_display_queue() {
        let err = Error::Queue("unknown delivery id".to_string());
        assert_eq!(err.to_string(), "Queue error: unknown delivery id");
    }

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("connection refused".to_string());
        assert_eq!(err.to_string(), "Request error: connection refused");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("bad timeout".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad timeout");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
