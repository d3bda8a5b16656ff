//! In-memory message socket for unit tests.
//!
//! [`MockSocket`] stands in for an upgraded axum WebSocket; the matching
//! [`MockPeer`] plays the remote client. Like the real socket, closing sends
//! a bare close frame unless one was already sent.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::ws::Message;
use futures_util::{Sink, Stream};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

type Incoming = Result<Message, axum::Error>;

/// Creates a connected socket/peer pair.
pub(crate) fn pair() -> (MockSocket, MockPeer) {
    let (to_socket, from_peer) = unbounded_channel();
    let (to_peer, from_socket) = unbounded_channel();

    let socket = MockSocket {
        incoming: from_peer,
        outgoing: Some(to_peer),
        close_sent: false,
    };
    let peer = MockPeer {
        outgoing: to_socket,
        incoming: from_socket,
    };
    (socket, peer)
}

// ============================================================================
// MockSocket
// ============================================================================

/// Server side of the pair.
pub(crate) struct MockSocket {
    incoming: UnboundedReceiver<Incoming>,
    outgoing: Option<UnboundedSender<Message>>,
    close_sent: bool,
}

impl Stream for MockSocket {
    type Item = Incoming;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.incoming.poll_recv(cx)
    }
}

impl Sink<Message> for MockSocket {
    type Error = axum::Error;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn start_send(mut self: Pin<&mut Self>, item: Message) -> Result<(), Self::Error> {
        if matches!(item, Message::Close(_)) {
            self.close_sent = true;
        }
        let sent = match &self.outgoing {
            Some(tx) => tx.send(item).is_ok(),
            None => false,
        };
        if sent {
            Ok(())
        } else {
            Err(axum::Error::new(io::Error::from(io::ErrorKind::BrokenPipe)))
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if let Some(tx) = self.outgoing.take()
            && !self.close_sent
        {
            self.close_sent = true;
            let _ = tx.send(Message::Close(None));
        }
        Poll::Ready(Ok(()))
    }
}

// ============================================================================
// MockPeer
// ============================================================================

/// Client side of the pair.
pub(crate) struct MockPeer {
    outgoing: UnboundedSender<Incoming>,
    incoming: UnboundedReceiver<Message>,
}

impl MockPeer {
    /// Delivers a message to the socket.
    pub(crate) fn send(&self, message: Message) {
        let _ = self.outgoing.send(Ok(message));
    }

    /// Makes the socket's next read fail with an IO error.
    pub(crate) fn fail(&self, kind: io::ErrorKind) {
        let _ = self.outgoing.send(Err(axum::Error::new(io::Error::from(kind))));
    }

    /// Next message the socket wrote; `None` once it has closed.
    pub(crate) async fn recv(&mut self) -> Option<Message> {
        self.incoming.recv().await
    }

    /// Stops accepting writes, so the socket's sends fail.
    pub(crate) fn stop_reading(&mut self) {
        self.incoming.close();
    }
}
