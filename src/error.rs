// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for netscope
//!
//! Only two kinds of error ever reach the caller of an intercepted exchange:
//! transport failures raised by the pipeline, which pass through untouched,
//! and [`Error::MissingConnection`], which signals a wiring mistake.
//! Failures on the telemetry path are logged and absorbed.

use thiserror::Error;

/// Result type alias for netscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for netscope
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed inside reqwest
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Transport failure raised by a pipeline stage other than reqwest
    #[error("Transport error: {0}")]
    Transport(String),

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// An interceptor that needs connection details was installed at a
    /// stage of the pipeline that has none.
    ///
    /// The request was already announced to the reporter by then, and no
    /// response or failure event follows it, so a recorder keeps that
    /// exchange pending.
    #[error(
        "No connection associated with this request; \
         the inspector must be registered as a network interceptor"
    )]
    MissingConnection,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Error::Transport(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: None,
        }
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this is a transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Http(_) | Error::Timeout { .. })
    }

    /// Check if this is recoverable (can retry)
    ///
    /// Configuration errors never are.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Transport(_) | Error::Http(_)
        )
    }

    /// Check if this error comes from how the pipeline was assembled
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingConnection | Error::Config(_))
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Timeout { url: Some(u), .. } => Some(u),
            Error::Http(e) => e.url().map(|u| u.as_str()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add URL context to error
    fn with_url(self, url: &str) -> Result<T>;

    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_url(self, url: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            match err {
                Error::Timeout {
                    operation,
                    duration_ms,
                    ..
                } => Error::Timeout {
                    operation,
                    duration_ms,
                    url: Some(url.to_string()),
                },
                other => other,
            }
        })
    }

    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}
