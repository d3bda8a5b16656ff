//! Per-connection echo loop.
//!
//! [`serve`] drives one [`Framing`] over one [`Connection`]: read a unit,
//! write the same unit back, repeat. The loop has no iteration cap and ends
//! on the first of:
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | peer close / end of stream | [`Outcome::Closed`] |
//! | read error (transport or protocol) | [`Outcome::Failed`] |
//! | write error | [`Outcome::Failed`] |
//!
//! Nothing is retried. Every framing, binary included, stops on the first
//! read failure instead of echoing a stale unit.
//!
//! On a peer close the handler answers with its own close frame before
//! dropping the connection. A protocol error gets a close frame carrying
//! the reason; a transport error just drops the connection.

// ============================================================================
// Imports
// ============================================================================

use axum::extract::ws::{CloseFrame, close_code};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::Framing;
use crate::transport::{Connection, MessageSocket};

// ============================================================================
// Constants
// ============================================================================

/// Control frames carry at most 125 bytes, two of which are the close code.
const MAX_CLOSE_REASON: usize = 123;

// ============================================================================
// Outcome
// ============================================================================

/// How a connection's echo loop ended.
#[derive(Debug)]
pub enum Outcome {
    /// The peer closed the connection.
    Closed {
        /// Turns completed before the close.
        turns: u64,
    },
    /// A read or write failed.
    Failed {
        /// Turns completed before the failure.
        turns: u64,
        /// The error that ended the loop.
        error: Error,
    },
}

impl Outcome {
    /// Returns `true` if the peer closed the connection.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }

    /// Number of completed read/echo turns.
    #[inline]
    #[must_use]
    pub fn turns(&self) -> u64 {
        match self {
            Self::Closed { turns } | Self::Failed { turns, .. } => *turns,
        }
    }

    /// The error that ended the loop, if any.
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Closed { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}

/// Result of a single turn.
enum Turn {
    Echoed,
    EndOfStream,
}

// ============================================================================
// Echo Loop
// ============================================================================

/// Runs the echo loop for `framing` until the connection ends.
///
/// The connection is closed (best effort) and dropped before returning.
pub async fn serve<S>(mut connection: Connection<S>, framing: Framing) -> Outcome
where
    S: MessageSocket,
{
    debug!(%framing, "Echo loop started");

    let mut scratch = vec![0u8; framing.scratch_len()];
    let mut turns = 0u64;

    let outcome = loop {
        match turn(&mut connection, framing, &mut scratch).await {
            Ok(Turn::Echoed) => turns += 1,
            Ok(Turn::EndOfStream) => break Outcome::Closed { turns },
            Err(error) => break Outcome::Failed { turns, error },
        }
    };

    match &outcome {
        Outcome::Closed { .. } => {
            debug!(%framing, "Peer closed connection");
            if let Err(e) = connection.close(None).await {
                trace!(error = %e, "Close reply failed");
            }
        }
        Outcome::Failed { error, .. } if error.is_protocol_error() => {
            warn!(%framing, error = %error, "Protocol error, closing connection");
            if let Err(e) = connection.close(Some(close_frame(error))).await {
                trace!(error = %e, "Close handshake failed");
            }
        }
        Outcome::Failed { error, .. } => {
            debug!(%framing, error = %error, "Transport error, dropping connection");
        }
    }

    info!(%framing, turns = outcome.turns(), "{} finished", framing.name());
    outcome
}

/// Performs one read-then-echo turn.
async fn turn<S: MessageSocket>(
    connection: &mut Connection<S>,
    framing: Framing,
    scratch: &mut [u8],
) -> Result<Turn> {
    match framing {
        Framing::Copy => {
            let Some(n) = connection.read_bytes(scratch).await? else {
                return Ok(Turn::EndOfStream);
            };
            connection.write_bytes(&scratch[..n]).await?;
        }

        Framing::FixedBuffer { .. } => {
            let Some(n) = connection.read_bytes(scratch).await? else {
                return Ok(Turn::EndOfStream);
            };
            let chunk = &scratch[..n];
            debug!(recv = ?String::from_utf8_lossy(chunk), len = n, "Chunk received");
            connection.write_bytes(chunk).await?;
            debug!(send = ?String::from_utf8_lossy(chunk), len = n, "Chunk echoed");
        }

        Framing::Text | Framing::Binary | Framing::Json => {
            let Some(message) = connection.read_message().await? else {
                return Ok(Turn::EndOfStream);
            };
            let unit = framing.decode(message)?;
            debug!(recv = ?unit, "Message received");
            connection.write_message(unit.into_message()?).await?;
            debug!(%framing, "Message echoed");
        }
    }

    Ok(Turn::Echoed)
}

/// Close frame sent after a protocol error.
fn close_frame(error: &Error) -> CloseFrame {
    let code = match error {
        Error::UnexpectedMessage { .. } => close_code::UNSUPPORTED,
        Error::Json(_) => close_code::INVALID,
        _ => close_code::PROTOCOL,
    };

    let mut reason = error.to_string();
    if reason.len() > MAX_CLOSE_REASON {
        let mut end = MAX_CLOSE_REASON;
        while !reason.is_char_boundary(end) {
            end -= 1;
        }
        reason.truncate(end);
    }

    CloseFrame {
        code,
        reason: reason.into(),
    }
}

// ============================================================================
// Tests
// ============================================================================
