//! # Client Settings
//!
//! Where the client sends its datagram and how long it waits for a reply.

use crate::config::DEFAULT_PORT;
use crate::error::{Error, Result};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Seconds the client waits for a reply.
pub const DEFAULT_CLIENT_TIMEOUT: u64 = 5;

/// Largest reply the client will accept, in bytes.
pub const DEFAULT_CLIENT_BUFFER_SIZE: usize = 1024;

/// Message sent when none is given on the command line.
pub const DEFAULT_CLIENT_MESSAGE: &str = "Hello, UDP Server!";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_ip: Ipv4Addr,
    pub server_port: u16,
    /// `0` waits forever.
    pub timeout_seconds: u64,
    pub buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_ip: Ipv4Addr::LOCALHOST,
            server_port: DEFAULT_PORT,
            timeout_seconds: DEFAULT_CLIENT_TIMEOUT,
            buffer_size: DEFAULT_CLIENT_BUFFER_SIZE,
        }
    }
}

impl ClientConfig {
    /// Point the client at `ip:port`.
    ///
    /// The port is taken as a wide integer so that out-of-range input from
    /// the command line is reported rather than silently wrapped. On error
    /// the configuration is left untouched.
    pub fn set_server_address(&mut self, ip: &str, port: i64) -> Result<()> {
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(Error::InvalidPort(port))?;
        let ip: Ipv4Addr = ip
            .trim()
            .parse()
            .map_err(|_| Error::InvalidAddress(ip.to_string()))?;

        self.server_ip = ip;
        self.server_port = port;
        Ok(())
    }

    /// The server's socket address.
    #[must_use]
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.server_ip, self.server_port))
    }
}

/// Parse a port given on the command line.
///
/// Returns `None` for anything that is not an integer in `1..=65535`;
/// the caller decides what to fall back to.
#[must_use]
pub fn parse_port_or_default(text: &str) -> Option<u16> {
    text.trim().parse::<u16>().ok().filter(|p| *p != 0)
}

// =============================================================================
// TESTS
// =============================================================================
