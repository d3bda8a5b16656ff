//! WebSocket transport layer.
//!
//! This module serves HTTP with axum, upgrades requests on routed paths to
//! WebSocket and wraps the upgraded sockets in a [`Connection`] for the echo
//! handler. Every other request gets the static info page.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   HTTP upgrade    ┌────────────────────────────────────┐
//! │  Client      │──────────────────►│  EchoServer (axum::serve)          │
//! │  (browser,   │                   │    │                               │
//! │   test)      │                   │    ├─ Router: one GET per route    │
//! │              │                   │    ├─ RouteTable::lookup(path)     │
//! │              │◄─────────────────►│    ├─ upgrade → Connection+handler │
//! │              │   WebSocket       │    └─ otherwise → info page        │
//! └──────────────┘                   └────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Message and raw-byte primitives over one WebSocket |
//! | `routes` | Path to framing table |
//! | `server` | Router, upgrade and dispatch |

// ============================================================================
// Submodules
// ============================================================================

/// Upgraded WebSocket connection.
pub mod connection;

/// Route table.
pub mod routes;

/// Router, upgrade and dispatch.
pub mod server;

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, MessageSocket};
pub use routes::{Route, RouteTable};
pub use server::EchoServer;
