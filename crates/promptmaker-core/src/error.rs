//! Error types for PromptMaker.
//!
//! Errors are organized by tier so the shell can tell the user whether to fix
//! their input, check their key or network, or simply try again:
//! - **input**: caught before any network activity
//! - **service**: transport and credential failures from the external call
//! - **response**: the reply could not be read as a prompt document
//! - **io**: reading or writing a result file failed

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for PromptMaker operations.
#[derive(Error, Debug)]
pub enum PromptError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The request was rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// The external service call failed
    #[error("{0}")]
    Service(#[from] ServiceError),

    /// The reply could not be coerced into the expected JSON shape
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Reading or writing a result file failed
    #[error("File I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Caller errors, always fixable by correcting the request.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("At least one reference image is required")]
    NoImages,

    #[error("Too many reference images: {count} (maximum {max})")]
    TooManyImages { count: usize, max: usize },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Cannot read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// File exceeds size limit
    #[error("Image too large: {name} ({:.2}MB > {}MB)", as_mb(.size_bytes), whole_mb(.max_bytes))]
    FileTooLarge {
        name: String,
        size_bytes: u64,
        max_bytes: u64,
    },

    #[error("Unsupported image format for {name}: {format} (expected JPEG, PNG or WEBP)")]
    UnsupportedFormat { name: String, format: String },

    #[error("Scene/style text must not be empty")]
    EmptyInstruction,
}

/// Failures of the outbound call. Surfaced as-is, never retried.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Network failure, timeout, server-side error or an empty/blocked reply
    #[error("Service unavailable: {message}")]
    Unavailable {
        message: String,
        status_code: Option<u16>,
    },

    /// Missing or rejected credential
    #[error("Authentication failed: {message}")]
    Auth {
        message: String,
        status_code: Option<u16>,
    },
}

impl ServiceError {
    /// Build an `Unavailable` error with no HTTP status.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            status_code: None,
        }
    }

    /// HTTP status of the failed call, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unavailable { status_code, .. } | Self::Auth { status_code, .. } => *status_code,
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Coarse classification of a [`PromptError`], shown to the user next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    ServiceUnavailable,
    AuthError,
    MalformedResponse,
    IoFailure,
    Config,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid input",
            Self::ServiceUnavailable => "Service unavailable",
            Self::AuthError => "Authentication error",
            Self::MalformedResponse => "Malformed response",
            Self::IoFailure => "I/O failure",
            Self::Config => "Configuration error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl PromptError {
    /// Which tier this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Service(ServiceError::Unavailable { .. }) => ErrorKind::ServiceUnavailable,
            Self::Service(ServiceError::Auth { .. }) => ErrorKind::AuthError,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::Io { .. } => ErrorKind::IoFailure,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

fn as_mb(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

fn whole_mb(bytes: &u64) -> u64 {
    *bytes / (1024 * 1024)
}

/// Convenience type alias for PromptMaker results.
pub type Result<T> = std::result::Result<T, PromptError>;
