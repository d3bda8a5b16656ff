//! Framing disciplines.
//!
//! A [`Framing`] decides what one echo turn reads and writes. Two of them
//! work on raw payload bytes with no message boundaries; the other three
//! work on whole WebSocket messages and decode them into a [`Unit`].
//!
//! | Framing | Unit of echo |
//! |---------|--------------|
//! | [`Framing::Copy`] | whatever bytes are available (up to [`COPY_BUFFER_SIZE`]) |
//! | [`Framing::FixedBuffer`] | at most `size` bytes of the current message |
//! | [`Framing::Text`] | one text message |
//! | [`Framing::Binary`] | one binary message |
//! | [`Framing::Json`] | one text message holding a [`Payload`] |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use axum::extract::ws::{Message, Utf8Bytes};
use bytes::Bytes;

use crate::error::{Error, Result};

use super::Payload;

// ============================================================================
// Constants
// ============================================================================

/// Scratch buffer used by the byte-stream copy.
pub const COPY_BUFFER_SIZE: usize = 32 * 1024;

/// Default chunk size for the fixed-buffer framing.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

// ============================================================================
// Framing
// ============================================================================

/// How a connection's stream is cut into units for echoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framing {
    /// Forward raw payload bytes as they arrive.
    Copy,
    /// Read at most `size` bytes per turn, never reassembling.
    FixedBuffer {
        /// Maximum bytes read and echoed per turn.
        size: usize,
    },
    /// One discrete text message per turn.
    Text,
    /// One discrete binary message per turn.
    Binary,
    /// One text message decoded as a [`Payload`] per turn.
    Json,
}

impl Framing {
    /// Fixed-buffer framing with the default chunk size.
    #[inline]
    #[must_use]
    pub const fn fixed_buffer() -> Self {
        Self::FixedBuffer {
            size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Short name used in logs.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::FixedBuffer { .. } => "fixed-buffer",
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Json => "json",
        }
    }

    /// Size of the scratch buffer a handler needs for this framing.
    ///
    /// Message-based framings need none.
    #[inline]
    #[must_use]
    pub const fn scratch_len(&self) -> usize {
        match self {
            Self::Copy => COPY_BUFFER_SIZE,
            Self::FixedBuffer { size } => *size,
            Self::Text | Self::Binary | Self::Json => 0,
        }
    }

    /// Decodes one received message into the unit this framing echoes.
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedMessage`] if the message type does not match
    /// - [`Error::Json`] if a `/json` message is not a valid [`Payload`]
    ///
    /// Byte framings have no message decoder and always return
    /// [`Error::UnexpectedMessage`].
    pub fn decode(&self, message: Message) -> Result<Unit> {
        match (self, message) {
            (Self::Text, Message::Text(text)) => Ok(Unit::Text(text)),
            (Self::Binary, Message::Binary(data)) => Ok(Unit::Binary(data)),
            (Self::Json, Message::Text(text)) => {
                Ok(Unit::Structured(Payload::from_json(text.as_str())?))
            }
            (Self::Text | Self::Json, other) => {
                Err(Error::unexpected_message("text", message_kind(&other)))
            }
            (Self::Binary, other) => Err(Error::unexpected_message("binary", message_kind(&other))),
            (Self::Copy | Self::FixedBuffer { .. }, other) => {
                Err(Error::unexpected_message("raw bytes", message_kind(&other)))
            }
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedBuffer { size } => write!(f, "{}({size})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

// ============================================================================
// Unit
// ============================================================================

/// One decoded unit of a message-based framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Text message contents.
    Text(Utf8Bytes),
    /// Binary message contents.
    Binary(Bytes),
    /// Decoded structured payload.
    Structured(Payload),
}

impl Unit {
    /// Encodes the unit back into the message it was read from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if a structured payload fails to encode.
    pub fn into_message(self) -> Result<Message> {
        match self {
            Self::Text(text) => Ok(Message::Text(text)),
            Self::Binary(data) => Ok(Message::Binary(data)),
            Self::Structured(payload) => Ok(Message::text(payload.to_json()?)),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Name of a message's type, for errors and logs.
#[must_use]
pub fn message_kind(message: &Message) -> &'static str {
    match message {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
    }
}

// ============================================================================
// Tests
// ============================================================================
