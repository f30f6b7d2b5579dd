//! Error types for Palaver
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Palaver operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, provider interactions, session handling,
/// and flat-file storage access.
#[derive(Error, Debug)]
pub enum PalaverError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, authentication, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Session state errors (unknown ids, invalid transitions)
    #[error("Session error: {0}")]
    Session(String),

    /// Flat-file storage errors (archive and memory files)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing credentials for the provider
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Palaver operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = PalaverError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_provider_error_display() {
        let error = PalaverError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_not_found_error_display() {
        let error = PalaverError::NotFound("chat 42".to_string());
        assert_eq!(error.to_string(), "Not found: chat 42");
    }

    #[test]
    fn test_storage_error_display() {
        let error = PalaverError::Storage("short write".to_string());
        assert_eq!(error.to_string(), "Storage error: short write");
    }

    #[test]
    fn test_missing_credentials_display() {
        let error = PalaverError::MissingCredentials("OPENAI_API_KEY".to_string());
        assert_eq!(error.to_string(), "Missing credentials: OPENAI_API_KEY");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: PalaverError = io_error.into();
        assert!(matches!(error, PalaverError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error: PalaverError = json_error.into();
        assert!(matches!(error, PalaverError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: PalaverError = yaml_error.into();
        assert!(matches!(error, PalaverError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PalaverError>();
    }
}
