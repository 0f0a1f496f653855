//! # UDP Server
//!
//! Receives datagrams and answers each one with the bytes produced by a
//! [`DataSource`]. Every step is written to the JSON event log when logging
//! is enabled.
//!
//! ```rust,ignore
//! let config = udpecho_core::load_config(Path::new("config.yaml"))?;
//! let reply = StaticResponse::new(config.server.response_message.clone());
//! UdpServer::bind(config, reply).await?.run().await;
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tracing::{error, info, warn};
use udpecho_core::{DataSource, LogEvent, Result, ServerConfig, process_data};

use crate::event_log::{EventLog, record};
use crate::socket;

/// Counters reported when the server stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub received: u64,
    pub sent: u64,
    pub errors: u64,
    pub timeouts: u64,
}

/// Outcome of one receive attempt.
enum Received {
    Datagram { message: String, peer: SocketAddr },
    TimedOut,
    Failed(std::io::Error),
}

/// A bound UDP server.
pub struct UdpServer {
    socket: UdpSocket,
    config: ServerConfig,
    responder: Arc<dyn DataSource + Send + Sync>,
    log: Option<EventLog>,
}

impl UdpServer {
    /// Open the event log, set up the socket and bind it.
    ///
    /// Socket options that cannot be applied are logged and skipped. Failing
    /// to create or bind the socket is an error.
    pub async fn bind<R>(config: ServerConfig, responder: R) -> Result<Self>
    where
        R: DataSource + Send + Sync + 'static,
    {
        let log = EventLog::from_config(&config.logging);
        record(log.as_ref(), LogEvent::server_start());

        let raw = socket::create_udp_socket().map_err(|e| {
            error!("Socket creation failed: {}", e);
            record(log.as_ref(), LogEvent::error("Socket creation failed"));
            e
        })?;

        if let Err(e) = socket::apply_socket_options(&raw, &config.socket_options, log.as_ref()) {
            warn!("Failed to apply some socket options ({}). Continuing with defaults.", e);
            record(
                log.as_ref(),
                LogEvent::warning("Failed to apply some socket options"),
            );
        }

        socket::bind_socket(&raw, config.server.port).map_err(|e| {
            error!("Bind failed on port {}: {}", config.server.port, e);
            record(log.as_ref(), LogEvent::error("Socket bind failed"));
            e
        })?;

        let socket = socket::into_tokio(raw)?;

        Ok(Self {
            socket,
            config,
            responder: Arc::new(responder),
            log,
        })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> ServerStats {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C ({}); serving until killed", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve until `shutdown` completes, then log `server_stop`.
    pub async fn run_until<F>(self, shutdown: F) -> ServerStats
    where
        F: Future<Output = ()>,
    {
        let mut stats = ServerStats::default();
        let mut buffer = vec![0u8; self.config.server.buffer_size];
        tokio::pin!(shutdown);

        match self.local_addr() {
            Ok(addr) => info!("UDP server started. Listening on {}...", addr),
            Err(_) => info!(
                "UDP server started. Listening on port {}...",
                self.config.server.port
            ),
        }

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                received = self.receive(&mut buffer) => match received {
                    Received::Datagram { message, peer } => {
                        stats.received += 1;
                        self.reply(&message, peer, &mut stats).await;
                    }
                    Received::TimedOut => {
                        stats.timeouts += 1;
                        info!("Receive timeout occurred");
                        self.record(LogEvent::timeout());
                    }
                    Received::Failed(e) => {
                        stats.errors += 1;
                        warn!("Receive error: {}", e);
                        self.record(LogEvent::error("Failed to receive message"));
                    }
                },
            }
        }

        info!(
            received = stats.received,
            sent = stats.sent,
            errors = stats.errors,
            timeouts = stats.timeouts,
            "UDP server stopped"
        );
        self.record(LogEvent::server_stop());
        stats
    }

    async fn receive(&self, buffer: &mut [u8]) -> Received {
        let timeout = self.config.socket_options.receive_timeout;
        let result = if timeout > 0 {
            match tokio::time::timeout(
                Duration::from_secs(timeout),
                self.socket.recv_from(buffer),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => return Received::TimedOut,
            }
        } else {
            self.socket.recv_from(buffer).await
        };

        match result {
            Ok((len, peer)) => Received::Datagram {
                message: String::from_utf8_lossy(&buffer[..len]).into_owned(),
                peer,
            },
            Err(e) => Received::Failed(e),
        }
    }

    async fn reply(&self, message: &str, peer: SocketAddr, stats: &mut ServerStats) {
        let (ip, port) = socket::client_info(peer);
        info!("Message from client {}:{}: {}", ip, port, message);
        self.record(LogEvent::message_received(message, peer));

        let reply = process_data(self.responder.as_ref());
        match self.socket.send_to(&reply, peer).await {
            Ok(_) => {
                stats.sent += 1;
                self.record(LogEvent::message_sent(
                    String::from_utf8_lossy(&reply),
                    peer,
                ));
            }
            Err(e) => {
                stats.errors += 1;
                warn!("Failed to send response to {}:{}: {}", ip, port, e);
                self.record(LogEvent::error("Failed to send response"));
            }
        }
    }

    fn record(&self, event: LogEvent) {
        record(self.log.as_ref(), event);
    }
}
