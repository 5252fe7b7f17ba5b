//! Error types for shardcursor
//!
//! This module defines all error types used throughout the result delivery layer.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for shardcursor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the result delivery layer
#[derive(Debug, Error)]
pub enum Error {
    /// The next pending document alone does not fit in the caller's byte budget
    #[error("Batch too small: document of {document_bytes} bytes does not fit in limit of {limit} bytes")]
    BatchTooSmall {
        /// Encoded size of the document that could not be placed
        document_bytes: u64,
        /// Byte limit supplied by the caller
        limit: u64,
    },

    /// The partition search executor failed to retrieve hits
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Building a result document from a hit failed
    #[error("Materialization error: {0}")]
    Materialization(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be parsed or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (config files, searcher reference release, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Create a retrieval error
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Error::Retrieval(msg.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Error::InvalidOperation(msg.into())
    }

    /// Create a materialization error
    pub fn materialization(msg: impl Into<String>) -> Self {
        Error::Materialization(msg.into())
    }

    /// Whether this error came from the partition search executor
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Error::Retrieval(_))
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
