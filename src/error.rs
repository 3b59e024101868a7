//! Error types for WWAN
//!
//! This module defines all error types used throughout the library. Only
//! [`ConfigError`] is fatal; the others are recovered at the scrape boundary.

use thiserror::Error;

/// Result type alias for WWAN operations
pub type Result<T> = std::result::Result<T, WwanError>;

/// Main error type for WWAN operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WwanError {
    /// Configuration error (startup only)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Device unavailable during a refresh
    #[error("Device unavailable: {0}")]
    Device(#[from] DeviceError),

    /// Field value could not be interpreted
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Multi-value key did not yield labels
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Errors while resolving settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Required setting absent from both the file and the environment
    #[error("{key} is not set in the config file or the environment")]
    Missing { key: &'static str },

    /// Setting present but not usable
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Config file exists but could not be read
    #[error("Failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Errors raised by a [`DeviceClient`](crate::DeviceClient)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// TCP connect refused, reset or remote disconnect
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request exceeded the client timeout
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Session expired or never established
    #[error("Login required")]
    LoginRequired,

    /// Credentials rejected
    #[error("Login failed (code {code})")]
    LoginFailed { code: u32 },

    /// CSRF token or session cookie rejected
    #[error("Session token rejected (code {code})")]
    Csrf { code: u32 },

    /// Router reports it is busy
    #[error("System busy")]
    Busy,

    /// Any other error document returned by the router
    #[error("Router error {code}: {message}")]
    Response { code: u32, message: String },

    /// Body was not the expected document
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Errors while interpreting a raw field value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Value is not numeric after unit stripping
    #[error("Not a number: {raw:?}")]
    NotNumeric { raw: String },

    /// Multi-value token without a ':' separator
    #[error("Malformed token {token:?} in {raw:?}")]
    MalformedToken { token: String, raw: String },
}

/// Errors while deriving labels from a multi-value key
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Key has no letters+digits run
    #[error("Key {key:?} does not name a carrier")]
    NoMatch { key: String },
}
