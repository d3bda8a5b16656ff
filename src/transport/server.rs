//! Echo server: axum router and per-connection dispatch.
//!
//! # Connection Flow
//!
//! 1. `axum::serve` accepts the TCP connection and parses the request
//! 2. WebSocket upgrade on a routed path: look the path up in the
//!    [`RouteTable`] and run the echo loop with its framing
//! 3. Anything else (plain request, unknown path, other method): answer
//!    with the static info page
//!
//! Every upgraded connection runs on its own task and shares nothing but the
//! read-only route table.

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{MatchedPath, State};
use axum::http::{HeaderMap, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::handler;
use crate::page;
use crate::protocol::Framing;

use super::{Connection, RouteTable};

// ============================================================================
// EchoServer
// ============================================================================

/// WebSocket echo server.
///
/// # Example
///
/// ```ignore
/// let routes = RouteTable::standard(100)?;
/// let server = EchoServer::start(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 23456, routes).await?;
/// println!("{}", server.http_url());
///
/// tokio::signal::ctrl_c().await?;
/// server.shutdown();
/// ```
pub struct EchoServer {
    /// Address the listener is bound to.
    local_addr: SocketAddr,

    /// Routes, fixed before the first connection is accepted.
    routes: Arc<RouteTable>,

    /// Shutdown signal for the accept loop.
    shutdown: watch::Sender<bool>,
}

/// State shared with every request handler.
#[derive(Clone)]
struct AppState {
    routes: Arc<RouteTable>,
    local_addr: SocketAddr,
}

// ============================================================================
// EchoServer - Constructor
// ============================================================================

impl EchoServer {
    /// Binds the listener and starts serving.
    ///
    /// # Arguments
    ///
    /// * `ip` - IP address to bind to
    /// * `port` - Port to bind to (0 for random)
    /// * `routes` - Route table, immutable from here on
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if binding fails.
    pub async fn start(ip: IpAddr, port: u16, routes: RouteTable) -> Result<Arc<Self>> {
        let listener = TcpListener::bind(SocketAddr::new(ip, port)).await?;
        let local_addr = listener.local_addr()?;

        debug!(%local_addr, routes = routes.len(), "Echo server bound");

        let routes = Arc::new(routes);
        let app = router(Arc::clone(&routes), local_addr);
        let (shutdown, mut signal) = watch::channel(false);

        tokio::spawn(async move {
            let stop = async move {
                let _ = signal.wait_for(|&stop| stop).await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(stop)
                .await
            {
                error!(error = %e, "Echo server failed");
            }
            debug!("Accept loop terminated");
        });

        info!(%local_addr, "Echo server started");

        Ok(Arc::new(Self {
            local_addr,
            routes,
            shutdown,
        }))
    }
}

// ============================================================================
// EchoServer - Public API
// ============================================================================

impl EchoServer {
    /// Returns the bound socket address.
    #[inline]
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the port the server is bound to.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Returns the route table.
    #[inline]
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Browsable URL of the info page.
    ///
    /// Format: `http://localhost:{port}/`
    #[inline]
    #[must_use]
    pub fn http_url(&self) -> String {
        format!("http://localhost:{}/", self.port())
    }

    /// WebSocket URL for `path`.
    ///
    /// Format: `ws://{host}:{port}{path}`, with `localhost` standing in for
    /// a wildcard bind address.
    #[must_use]
    pub fn ws_url(&self, path: &str) -> String {
        format!("{}{path}", ws_base(self.local_addr, None))
    }

    /// Stops accepting new connections.
    ///
    /// Connections already upgraded are left to finish on their own.
    pub fn shutdown(&self) {
        info!("Echo server shutting down");
        self.shutdown.send_replace(true);
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    #[inline]
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Builds the router: one upgrade endpoint per route, the info page for
/// everything else.
fn router(routes: Arc<RouteTable>, local_addr: SocketAddr) -> Router {
    let state = AppState {
        routes: Arc::clone(&routes),
        local_addr,
    };

    routes
        .iter()
        .fold(Router::<AppState>::new(), |router, route| {
            router.route(&route.path, get(echo_route).fallback(info_page))
        })
        .fallback(info_page)
        .with_state(state)
}

/// Upgrades a request on a routed path, or falls back to the info page.
async fn echo_route(
    State(state): State<AppState>,
    path: MatchedPath,
    headers: HeaderMap,
    upgrade: std::result::Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    match (upgrade, state.routes.lookup(path.as_str())) {
        (Ok(upgrade), Some(framing)) => {
            let path = path.as_str().to_owned();
            upgrade
                .on_upgrade(move |socket| echo_socket(socket, framing, path))
                .into_response()
        }
        (Err(rejection), _) => {
            debug!(path = path.as_str(), %rejection, "Not an upgrade, serving info page");
            info_page(State(state), headers).await.into_response()
        }
        (Ok(_), None) => info_page(State(state), headers).await.into_response(),
    }
}

/// Runs the echo loop on an upgraded socket.
async fn echo_socket(socket: WebSocket, framing: Framing, path: String) {
    info!(%path, %framing, "WebSocket connection established");

    let outcome = handler::serve(Connection::new(socket), framing).await;
    debug!(%path, closed = outcome.is_closed(), "Connection released");
}

/// Serves the static info page.
async fn info_page(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let body = page::render(&ws_base(state.local_addr, host), &state.routes);

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "close"),
        ],
        Html(body),
    )
}

/// WebSocket base URL, preferring the client's `Host` header.
fn ws_base(local_addr: SocketAddr, host: Option<&str>) -> String {
    match host {
        Some(host) if !host.is_empty() => format!("ws://{host}"),
        _ if local_addr.ip().is_unspecified() => format!("ws://localhost:{}", local_addr.port()),
        _ => format!("ws://{local_addr}"),
    }
}

// ============================================================================
// Tests
// ============================================================================
