//! ws-echo - WebSocket echo reference server.
//!
//! Every accepted connection is bound to one framing discipline by its
//! request path and echoes what it reads until the peer goes away.
//!
//! # Architecture
//!
//! - **Server** ([`EchoServer`]): an axum router with one GET route per
//!   framing; WebSocket upgrades there go to the echo handler, everything
//!   else gets the static info page
//! - **Route table** ([`RouteTable`]): path to [`Framing`], built once
//! - **Handler** ([`handler::serve`]): read one unit, write it back, repeat
//! - **Framing** ([`Framing`]): byte stream, fixed buffer, text, binary, JSON
//!
//! # Quick Start
//!
//! ```no_run
//! use std::net::{IpAddr, Ipv4Addr};
//!
//! use ws_echo::{EchoServer, Result, RouteTable};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let routes = RouteTable::standard(100)?;
//!     let server = EchoServer::start(IpAddr::V4(Ipv4Addr::LOCALHOST), 23456, routes).await?;
//!     println!("{}", server.http_url());
//!
//!     tokio::signal::ctrl_c().await?;
//!     server.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | CLI and TOML configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`handler`] | Per-connection echo loop |
//! | [`page`] | Static info page |
//! | [`protocol`] | Framing disciplines and the JSON payload |
//! | [`transport`] | HTTP router, route table, WebSocket connection |

// ============================================================================
// Modules
// ============================================================================

/// Configuration from command line and TOML file.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Per-connection echo loop.
pub mod handler;

/// Static info page.
pub mod page;

/// Framing disciplines and payload types.
pub mod protocol;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::Config;

// Error types
pub use error::{Error, Result};

// Handler
pub use handler::Outcome;

// Protocol types
pub use protocol::{Framing, Payload, Unit};

// Transport types
pub use transport::{Connection, EchoServer, MessageSocket, Route, RouteTable};
