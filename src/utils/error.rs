//! Custom error types for cert-inspector
//!
//! This module defines domain-specific error types using `thiserror` for
//! the failure modes that abort an inspection. Best-effort steps (AIA
//! fetching, partial chain decoding) never surface here; they are logged
//! and degrade the result instead.

use thiserror::Error;

/// Top-level error type for cert-inspector operations
#[derive(Error, Debug)]
pub enum InspectorError {
    #[error("Certificate error: {0}")]
    Certificate(#[from] CertificateError),

    #[error("Private key error: {0}")]
    Key(#[from] KeyError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Certificate decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    #[error("Failed to decode certificate: {message}")]
    Decode { message: String },

    #[error("No valid certificates found in the supplied data")]
    NoCertificates,

    #[error("Input of {size} bytes exceeds the maximum allowed size of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },
}

impl CertificateError {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        CertificateError::Decode {
            message: message.into(),
        }
    }
}

/// Private key loading and pairing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Failed to parse private key: {message}")]
    Parse { message: String },

    #[error("Private key is encrypted and no password was supplied")]
    PasswordRequired,

    #[error("Certificate and private key do not match: {reason}")]
    Mismatch { reason: String },
}

impl KeyError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        KeyError::Parse {
            message: message.into(),
        }
    }
}

/// Network errors from live endpoint retrieval and issuer downloads
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Connection to {host}:{port} timed out")]
    ConnectTimeout { host: String, port: u16 },

    #[error("Failed to resolve hostname {host}: {message}")]
    Resolution { host: String, message: String },

    #[error("Failed to connect to {host}:{port}: {message}")]
    Connection {
        host: String,
        port: u16,
        message: String,
    },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Invalid port number {port}: must be between 1 and 65535")]
    InvalidPort { port: u16 },

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Report rendering errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize report: {message}")]
    Serialization { message: String },
}

/// Result type alias using InspectorError
pub type Result<T> = std::result::Result<T, InspectorError>;
