//! # UDP Client
//!
//! Sends one datagram to the server and waits for one reply.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use tracing::debug;
use udpecho_core::{ClientConfig, Error, Result};

/// Client bound to an ephemeral local port.
#[derive(Debug)]
pub struct UdpClient {
    socket: UdpSocket,
    config: ClientConfig,
}

impl UdpClient {
    /// Bind a local socket for talking to `config.server_addr()`.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
        Ok(Self { socket, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Send `message` and return the server's reply.
    ///
    /// Replies longer than `buffer_size` are truncated. Returns
    /// [`Error::Timeout`] when nothing arrives within `timeout_seconds`.
    pub async fn send_and_receive(&self, message: &str) -> Result<String> {
        let target = self.config.server_addr();
        let sent = self.socket.send_to(message.as_bytes(), target).await?;
        debug!("Sent {} bytes to {}", sent, target);

        let mut buffer = vec![0u8; self.config.buffer_size.max(1)];
        let recv = self.socket.recv_from(&mut buffer);
        let (len, from) = match self.config.timeout_seconds {
            0 => recv.await?,
            secs => tokio::time::timeout(Duration::from_secs(secs), recv)
                .await
                .map_err(|_| Error::Timeout(secs))??,
        };
        debug!("Received {} bytes from {}", len, from);

        Ok(String::from_utf8_lossy(&buffer[..len]).into_owned())
    }
}
