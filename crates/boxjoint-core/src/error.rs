//! Error handling for the box joint companion
//!
//! Provides the error types shared across crates:
//! - Connection errors (serial transport)
//! - Format errors (comma-separated number lists)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents errors raised by the line-delimited serial transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Transport is not connected
    #[error("Not connected")]
    NotConnected,

    /// Transport is already connected
    #[error("Already connected to {device}")]
    AlreadyConnected {
        /// The device the transport is connected to.
        device: String,
    },

    /// The port could not be opened
    #[error("Failed to open port {port}: {reason}")]
    PortOpenFailed {
        /// The port or device name.
        port: String,
        /// The reason the open failed.
        reason: String,
    },

    /// No device with the requested name exists
    #[error("Device not found: {name}")]
    DeviceNotFound {
        /// The requested device name.
        name: String,
    },

    /// Writing to the port failed
    #[error("Write failed: {reason}")]
    WriteFailed {
        /// The reason the write failed.
        reason: String,
    },

    /// Reading from the port failed
    #[error("Read failed: {reason}")]
    ReadFailed {
        /// The reason the read failed.
        reason: String,
    },
}

/// Number list format error type
///
/// Raised when text does not hold a comma-separated list of integers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The input contained no tokens at all
    #[error("Number list is empty")]
    Empty,

    /// A token is not a valid integer
    #[error("Invalid number '{token}' at position {index}")]
    InvalidNumber {
        /// Zero-based position of the token in the list.
        index: usize,
        /// The offending token, trimmed.
        token: String,
    },
}

/// Main error type for the box joint companion
///
/// A unified error type for the library crates' public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Format error
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a format error
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
