// WWAN Exporter - Prometheus exporter for Huawei LTE/5G routers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the exporter binary

use thiserror::Error;

/// Errors that stop the exporter or fail a single encoding pass
#[derive(Error, Debug)]
pub enum ExporterError {
    /// Settings could not be resolved
    #[error("Configuration error: {0}")]
    Config(#[from] wwan::ConfigError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Registry rejected a metric family
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// Encoded metrics were not valid UTF-8
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Runtime or listener failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for exporter operations
pub type Result<T> = std::result::Result<T, ExporterError>;
