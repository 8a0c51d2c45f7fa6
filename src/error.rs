//! Error types for Palaver
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Palaver operations
///
/// This enum encompasses all possible errors that can occur during
/// relay handling, provider interactions, configuration loading,
/// session management, and conversation persistence.
#[derive(Error, Debug)]
pub enum PalaverError {
    /// Configuration-related errors (bad config file, missing credential)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client supplied a malformed request body
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream provider errors (API calls, unusable responses)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Relay API errors (the chat client talking to the relay server)
    #[error("Relay error: {0}")]
    Relay(String),

    /// Session state errors
    #[error("Session error: {0}")]
    Session(String),

    /// Conversation storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

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
