//! Upgraded WebSocket connection.
//!
//! Wraps one message socket (an axum [`WebSocket`](axum::extract::ws::WebSocket)
//! in production) and exposes the two primitive families the framings are
//! built on:
//!
//! - message primitives: [`Connection::read_message`] / [`Connection::write_message`]
//! - raw byte primitives: [`Connection::read_bytes`] / [`Connection::write_bytes`]
//!
//! Raw reads drain the payload of the current data message and only pull the
//! next message once it is exhausted, so message boundaries disappear. A
//! connection should stick to one family for its whole life.
//!
//! Ping and pong frames are answered by the WebSocket layer and never surface
//! here.

// ============================================================================
// Imports
// ============================================================================

use axum::extract::ws::{CloseFrame, Message};
use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tracing::trace;

use crate::error::Result;

// ============================================================================
// MessageSocket
// ============================================================================

/// A bidirectional WebSocket message channel.
///
/// Implemented for every stream/sink pair of axum messages, which covers
/// [`WebSocket`](axum::extract::ws::WebSocket).
pub trait MessageSocket:
    Stream<Item = std::result::Result<Message, axum::Error>>
    + Sink<Message, Error = axum::Error>
    + Unpin
{
}

impl<T> MessageSocket for T where
    T: Stream<Item = std::result::Result<Message, axum::Error>>
        + Sink<Message, Error = axum::Error>
        + Unpin
{
}

// ============================================================================
// FrameKind
// ============================================================================

/// Frame type raw bytes are written back with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FrameKind {
    /// Text frame.
    #[default]
    Text,
    /// Binary frame.
    Binary,
}

// ============================================================================
// Connection
// ============================================================================

/// One upgraded WebSocket connection, owned by a single handler.
pub struct Connection<S> {
    /// Underlying message socket.
    ws: S,
    /// Unread payload of the current message for raw reads.
    pending: Option<Bytes>,
    /// Frame type of the message raw bytes were last read from.
    kind: FrameKind,
}

impl<S: MessageSocket> Connection<S> {
    /// Wraps an upgraded WebSocket.
    #[inline]
    #[must_use]
    pub fn new(ws: S) -> Self {
        Self {
            ws,
            pending: None,
            kind: FrameKind::default(),
        }
    }

    /// Reads the next data message.
    ///
    /// Returns `Ok(None)` when the peer closes the connection, either with a
    /// close frame or by ending the stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`](crate::Error::WebSocket) on transport or
    /// framing failure.
    pub async fn read_message(&mut self) -> Result<Option<Message>> {
        loop {
            match self.ws.next().await {
                Some(Ok(message @ (Message::Text(_) | Message::Binary(_)))) => {
                    return Ok(Some(message));
                }
                Some(Ok(Message::Close(frame))) => {
                    trace!(?frame, "Close frame received");
                    return Ok(None);
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            }
        }
    }

    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`](crate::Error::WebSocket) if the send fails.
    pub async fn write_message(&mut self, message: Message) -> Result<()> {
        self.ws.send(message).await?;
        Ok(())
    }

    /// Reads at most `buf.len()` payload bytes.
    ///
    /// Returns `Ok(None)` at end of stream. `Ok(Some(0))` means the current
    /// message was empty, which is not the end of the stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`](crate::Error::WebSocket) on transport or
    /// framing failure.
    pub async fn read_bytes(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        let mut pending = match self.pending.take() {
            Some(pending) => pending,
            None => match self.read_message().await? {
                Some(message) => {
                    self.kind = match message {
                        Message::Binary(_) => FrameKind::Binary,
                        _ => FrameKind::Text,
                    };
                    message.into_data()
                }
                None => return Ok(None),
            },
        };

        let n = pending.len().min(buf.len());
        let chunk = pending.split_to(n);
        buf[..n].copy_from_slice(&chunk);

        if !pending.is_empty() {
            self.pending = Some(pending);
        }

        Ok(Some(n))
    }

    /// Writes raw bytes back as one message.
    ///
    /// The frame type follows the message the bytes were read from. Text that
    /// was cut in the middle of a UTF-8 sequence goes out as a binary frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`](crate::Error::WebSocket) if the send fails.
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let message = match (self.kind, std::str::from_utf8(bytes)) {
            (FrameKind::Text, Ok(text)) => Message::text(text),
            (FrameKind::Text, Err(_)) => {
                trace!(len = bytes.len(), "Chunk splits a UTF-8 sequence, sending as binary");
                Message::binary(Bytes::copy_from_slice(bytes))
            }
            (FrameKind::Binary, _) => Message::binary(Bytes::copy_from_slice(bytes)),
        };

        self.write_message(message).await
    }

    /// Sends an optional close frame and finishes the closing handshake.
    ///
    /// After the peer has closed, this flushes the queued close reply so the
    /// peer sees a clean close instead of a reset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`](crate::Error::WebSocket) if the close
    /// frame cannot be sent.
    pub async fn close(&mut self, frame: Option<CloseFrame>) -> Result<()> {
        if let Some(frame) = frame {
            self.ws.send(Message::Close(Some(frame))).await?;
        }
        self.ws.close().await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
