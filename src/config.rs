//! Configuration for the echo server.
//!
//! Supports both command-line arguments and a TOML configuration file.
//! CLI arguments take precedence over config file values.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 23456
//!
//! [echo]
//! chunk_size = 100
//!
//! [logging]
//! level = "info"
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::protocol::DEFAULT_CHUNK_SIZE;

// ============================================================================
// Constants
// ============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 23456;

// ============================================================================
// CLI
// ============================================================================

/// Command-line arguments for the echo server
#[derive(Parser, Debug, Default)]
#[command(name = "ws-echo")]
#[command(version)]
#[command(about = "WebSocket echo server with five framing disciplines", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (e.g., 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Bytes read per turn on /readWrite
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

// ============================================================================
// TOML
// ============================================================================

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub echo: EchoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Echo behaviour
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EchoConfig {
    /// Fixed-buffer chunk size
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// Config
// ============================================================================

/// Final resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub chunk_size: usize,
    pub log_level: String,
}

impl Config {
    /// Load configuration from process arguments and optional TOML file.
    ///
    /// # Errors
    ///
    /// See [`Config::from_args`].
    pub fn load() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Resolve configuration from parsed CLI arguments.
    /// CLI arguments take precedence over TOML file values.
    ///
    /// # Errors
    ///
    /// - [`Error::ConfigFile`] if the config file cannot be read
    /// - [`Error::ConfigParse`] if it is not valid TOML
    /// - [`Error::Config`] if the host or chunk size is invalid
    pub fn from_args(cli: CliArgs) -> Result<Self> {
        let toml_config = match cli.config {
            Some(ref path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| {
                    Error::ConfigFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                toml::from_str(&contents).map_err(|source| Error::ConfigParse {
                    path: path.clone(),
                    source,
                })?
            }
            None => TomlConfig::default(),
        };

        Self::merge(cli, toml_config)
    }

    /// Merge CLI args over TOML values and validate the result.
    fn merge(cli: CliArgs, toml_config: TomlConfig) -> Result<Self> {
        let host = cli.host.unwrap_or(toml_config.server.host);
        let host: IpAddr = host
            .parse()
            .map_err(|e| Error::config(format!("invalid host {host:?}: {e}")))?;

        let chunk_size = cli.chunk_size.unwrap_or(toml_config.echo.chunk_size);
        if chunk_size == 0 {
            return Err(Error::config("chunk size must be positive"));
        }

        Ok(Config {
            host,
            port: cli.port.unwrap_or(toml_config.server.port),
            chunk_size,
            log_level: cli.log_level.unwrap_or(toml_config.logging.level),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            log_level: default_log_level(),
        }
    }
}
