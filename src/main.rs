//! ws-echo: WebSocket echo reference server
//!
//! Routes:
//! - `/copy`: raw byte stream
//! - `/readWrite`: fixed 100-byte buffer
//! - `/sendRecvText`: text messages
//! - `/sendRecvArrayBuffer`, `/sendRecvBlob`: binary messages
//! - `/json`: `{"Msg", "Path"}` JSON messages
//! - anything else: interactive test page

use tracing::info;
use tracing_subscriber::EnvFilter;
use ws_echo::{Config, EchoServer, RouteTable};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        host = %config.host,
        port = config.port,
        chunk_size = config.chunk_size,
        "Starting ws-echo server"
    );

    let routes = RouteTable::standard(config.chunk_size)?;
    let server = EchoServer::start(config.host, config.port, routes).await?;

    println!("{}", server.http_url());

    tokio::signal::ctrl_c().await?;
    server.shutdown();

    Ok(())
}
