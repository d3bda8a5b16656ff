//! Error types for the echo server.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use ws_echo::{Result, Error};
//!
//! async fn example(connection: &mut Connection<WebSocket>) -> Result<()> {
//!     if let Some(message) = connection.read_message().await? {
//!         connection.write_message(message).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::ConfigFile`], [`Error::ConfigParse`] |
//! | Transport | [`Error::Io`], [`Error::WebSocket`] |
//! | Protocol | [`Error::UnexpectedMessage`], [`Error::Json`] |
//!
//! A peer closing the connection is not an error: reads return `Ok(None)`.
//! The handler loop treats protocol and transport errors the same way (the
//! connection ends), but the predicates below keep them apart for logging.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a configuration value is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Configuration file could not be read.
    #[error("Failed to read config file '{}': {source}", path.display())]
    ConfigFile {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        source: IoError,
    },

    /// Configuration file is not valid TOML for the expected layout.
    #[error("Failed to parse config file '{}': {source}", path.display())]
    ConfigParse {
        /// Path of the file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// A message of the wrong type arrived for the active framing.
    #[error("Unexpected {received} message, expected {expected}")]
    UnexpectedMessage {
        /// Message type the framing accepts.
        expected: &'static str,
        /// Message type that arrived.
        received: &'static str,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket read or write failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] axum::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an unexpected message error.
    #[inline]
    pub fn unexpected_message(expected: &'static str, received: &'static str) -> Self {
        Self::UnexpectedMessage { expected, received }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the peer sent something the framing rejects.
    #[inline]
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::UnexpectedMessage { .. } | Self::Json(_))
    }

    /// Returns `true` if the underlying transport failed.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Io(_) | Self::WebSocket(_))
    }

    /// Returns `true` if this is a configuration error.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::ConfigFile { .. } | Self::ConfigParse { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
