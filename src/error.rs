// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the interception engine
//!
//! Every variant maps onto one protocol error code so that command results
//! can be handed back to the automation client unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for interception operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the interception engine
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range input, including a command issued in the
    /// wrong phase for the blocked exchange
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown or already resolved request id
    #[error("No such request: {0}")]
    NoSuchRequest(String),

    /// Unknown intercept id
    #[error("No such intercept: {0}")]
    NoSuchIntercept(String),

    /// Unknown or stale browsing context id
    #[error("No such frame: {0}")]
    NoSuchFrame(String),

    /// Valid input that the engine does not implement
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Command name not handled by this module
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Error object returned through the command channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Protocol error code
    pub error: String,
    /// Human readable message
    pub message: String,
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a no such request error
    pub fn no_such_request<S: Into<String>>(request: S) -> Self {
        Error::NoSuchRequest(request.into())
    }

    /// Create a no such intercept error
    pub fn no_such_intercept<S: Into<String>>(intercept: S) -> Self {
        Error::NoSuchIntercept(intercept.into())
    }

    /// Create a no such frame error
    pub fn no_such_frame<S: Into<String>>(context: S) -> Self {
        Error::NoSuchFrame(context.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::UnsupportedOperation(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Protocol error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "invalid argument",
            Error::NoSuchRequest(_) => "no such request",
            Error::NoSuchIntercept(_) => "no such intercept",
            Error::NoSuchFrame(_) => "no such frame",
            Error::UnsupportedOperation(_) => "unsupported operation",
            Error::UnknownCommand(_) => "unknown command",
            Error::Serialization(_) | Error::Other(_) => "unknown error",
        }
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    /// Check if this is a no such request error
    pub fn is_no_such_request(&self) -> bool {
        matches!(self, Error::NoSuchRequest(_))
    }

    /// Check if this error was caused by the client input rather than the engine
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Serialization(_) | Error::Other(_))
    }

    /// Build the wire error object
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
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
    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;

    /// Treat any failure as malformed client input
    fn invalid_argument(self, msg: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", msg, e)))
    }

    fn invalid_argument(self, msg: &str) -> Result<T> {
        self.map_err(|e| Error::InvalidArgument(format!("{}: {}", msg, e)))
    }
}
