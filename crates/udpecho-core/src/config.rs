//! # Server Configuration
//!
//! The server reads a YAML file with three optional sections:
//!
//! ```yaml
//! server:
//!   port: 8888
//!   buffer_size: 1024
//!   response_message: "Message received"
//! logging:
//!   file: "udp_server.log"
//!   enable: true
//! socket_options:
//!   reuse_addr: true
//!   receive_buffer: 8192
//!   send_buffer: 8192
//!   broadcast: false
//!   ttl: 64
//!   receive_timeout: 0
//! ```
//!
//! Any key may be omitted. A missing file is not an error: the server
//! falls back to [`ServerConfig::default`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8888;

/// Default receive buffer, in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Default reply sent for every datagram.
pub const DEFAULT_RESPONSE: &str = "Message received";

/// Default event log path.
pub const DEFAULT_LOG_FILE: &str = "udp_server.log";

/// Default `SO_RCVBUF` / `SO_SNDBUF` size, in bytes.
pub const DEFAULT_SOCKET_BUFFER: u32 = 8192;

/// Default IP time-to-live.
pub const DEFAULT_TTL: u32 = 64;

/// Largest payload a single IPv4 UDP datagram can carry.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Longest accepted response message, in bytes.
pub const MAX_RESPONSE_LEN: usize = 255;

// =============================================================================
// SECTIONS
// =============================================================================

/// The `server:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// UDP port to listen on. `0` asks the OS for an ephemeral port.
    pub port: u16,
    /// Size of the receive buffer; longer datagrams are truncated.
    pub buffer_size: usize,
    /// Reply sent to every client.
    pub response_message: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            response_message: DEFAULT_RESPONSE.to_string(),
        }
    }
}

/// The `logging:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path of the JSON event log.
    pub file: PathBuf,
    /// Whether the event log is written at all.
    pub enable: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
            enable: true,
        }
    }
}

/// The `socket_options:` section.
///
/// Zero sizes and a zero TTL mean "leave the system default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketOptions {
    pub reuse_addr: bool,
    pub receive_buffer: u32,
    pub send_buffer: u32,
    pub broadcast: bool,
    pub ttl: u32,
    /// Seconds to wait for a datagram before logging a timeout. `0` waits forever.
    pub receive_timeout: u64,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            reuse_addr: true,
            receive_buffer: DEFAULT_SOCKET_BUFFER,
            send_buffer: DEFAULT_SOCKET_BUFFER,
            broadcast: false,
            ttl: DEFAULT_TTL,
            receive_timeout: 0,
        }
    }
}

// =============================================================================
// SERVER CONFIG
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub logging: LoggingConfig,
    pub socket_options: SocketOptions,
}

impl ServerConfig {
    /// Parse a configuration from YAML text.
    ///
    /// An empty document (or one holding only comments) yields the defaults.
    /// The result is not validated; call [`ServerConfig::validate`].
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let doc: serde_yaml::Value = serde_yaml::from_str(text)?;
        if doc.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(doc)?)
    }

    /// Check values and repair the ones that have a safe default.
    pub fn validate(&mut self) -> Result<()> {
        if self.server.buffer_size == 0 {
            warn!(
                "buffer_size of 0 is unusable, falling back to {}",
                DEFAULT_BUFFER_SIZE
            );
            self.server.buffer_size = DEFAULT_BUFFER_SIZE;
        }

        if self.server.buffer_size > MAX_DATAGRAM_SIZE {
            return Err(Error::config(format!(
                "buffer_size {} exceeds the largest UDP payload ({})",
                self.server.buffer_size, MAX_DATAGRAM_SIZE
            )));
        }

        if self.server.response_message.len() > MAX_RESPONSE_LEN {
            return Err(Error::config(format!(
                "response_message is {} bytes, limit is {}",
                self.server.response_message.len(),
                MAX_RESPONSE_LEN
            )));
        }

        if self.socket_options.ttl > 255 {
            return Err(Error::config(format!(
                "ttl {} out of valid range 0..=255",
                self.socket_options.ttl
            )));
        }

        Ok(())
    }
}

impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        let sock = &self.socket_options;

        writeln!(
            f,
            "Configuration loaded: Port={}, Buffer size={}, Response message={}",
            self.server.port, self.server.buffer_size, self.server.response_message
        )?;
        writeln!(
            f,
            "Log settings: File={}, Enabled={}",
            self.logging.file.display(),
            yes_no(self.logging.enable)
        )?;
        write!(
            f,
            "Socket options: REUSEADDR={}, RCVBUF={}, SNDBUF={}, BROADCAST={}, TTL={}, RCVTIMEO={}",
            yes_no(sock.reuse_addr),
            sock.receive_buffer,
            sock.send_buffer,
            yes_no(sock.broadcast),
            sock.ttl,
            sock.receive_timeout
        )
    }
}

/// Load and validate the configuration at `path`.
///
/// A missing file yields the defaults with a warning. A file that exists
/// but cannot be read or parsed is an error.
pub fn load_config(path: &Path) -> Result<ServerConfig> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "Cannot open configuration file {}. Using default settings.",
                path.display()
            );
            return Ok(ServerConfig::default());
        }
        Err(e) => {
            return Err(Error::config(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };

    let mut config = ServerConfig::from_yaml_str(&text)
        .map_err(|e| Error::config(format!("failed to parse {}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

// =============================================================================
// TESTS
// =============================================================================
