//! UDP socket construction and option handling.
//!
//! Sockets are built with socket2 so options can be applied before the
//! socket is bound and handed to tokio.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, warn};
use udpecho_core::{Error, LogEvent, Result, SocketOptions};

use crate::event_log::{EventLog, record};

/// Create an IPv4 datagram socket.
pub fn create_udp_socket() -> Result<Socket> {
    Ok(Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?)
}

/// Apply the configured options to `socket`.
///
/// Options are applied in a fixed order. The first one that fails is
/// recorded as a `socket_error` event and returned; the rest are skipped.
pub fn apply_socket_options(
    socket: &Socket,
    options: &SocketOptions,
    log: Option<&EventLog>,
) -> Result<()> {
    if options.reuse_addr {
        check(
            socket.set_reuse_address(true),
            "SO_REUSEADDR",
            "Failed to set SO_REUSEADDR",
            log,
        )?;
        debug!("Set SO_REUSEADDR: enabled");
    }

    if options.receive_buffer > 0 {
        check(
            socket.set_recv_buffer_size(options.receive_buffer as usize),
            "SO_RCVBUF",
            "Failed to set receive buffer size",
            log,
        )?;
        debug!("Set SO_RCVBUF: {} bytes", options.receive_buffer);
    }

    if options.send_buffer > 0 {
        check(
            socket.set_send_buffer_size(options.send_buffer as usize),
            "SO_SNDBUF",
            "Failed to set send buffer size",
            log,
        )?;
        debug!("Set SO_SNDBUF: {} bytes", options.send_buffer);
    }

    if options.broadcast {
        check(
            socket.set_broadcast(true),
            "SO_BROADCAST",
            "Failed to enable broadcast",
            log,
        )?;
        debug!("Set SO_BROADCAST: enabled");
    }

    if options.ttl > 0 {
        check(socket.set_ttl(options.ttl), "IP_TTL", "Failed to set TTL", log)?;
        debug!("Set IP_TTL: {}", options.ttl);
    }

    if options.receive_timeout > 0 {
        check(
            socket.set_read_timeout(Some(Duration::from_secs(options.receive_timeout))),
            "SO_RCVTIMEO",
            "Failed to set receive timeout",
            log,
        )?;
        debug!("Set SO_RCVTIMEO: {} seconds", options.receive_timeout);
    }

    Ok(())
}

fn check(
    result: std::io::Result<()>,
    option: &'static str,
    message: &str,
    log: Option<&EventLog>,
) -> Result<()> {
    result.map_err(|source| {
        warn!("{}: {}", message, source);
        record(log, LogEvent::socket_error(message));
        Error::SocketOption { option, source }
    })
}

/// Bind `socket` to every local interface on `port`.
pub fn bind_socket(socket: &Socket, port: u16) -> Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    socket.bind(&addr.into())?;
    Ok(())
}

/// Convert a bound socket into a tokio socket.
///
/// Must be called from within a tokio runtime.
pub fn into_tokio(socket: Socket) -> Result<tokio::net::UdpSocket> {
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(tokio::net::UdpSocket::from_std(std_socket)?)
}

/// Client address as printable IP and port.
#[must_use]
pub fn client_info(addr: SocketAddr) -> (String, u16) {
    (addr.ip().to_string(), addr.port())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use udpecho_core::EventKind;

    #[test]
    fn defaults_are_applied() {
        let socket = create_udp_socket().unwrap();
        apply_socket_options(&socket, &SocketOptions::default(), None).unwrap();

        assert!(socket.reuse_address().unwrap());
        assert!(!socket.broadcast().unwrap());
        assert_eq!(socket.ttl().unwrap(), 64);
        // The kernel may round buffer sizes up (Linux doubles them).
        assert!(socket.recv_buffer_size().unwrap() >= 8192);
        assert!(socket.send_buffer_size().unwrap() >= 8192);
        assert_eq!(socket.read_timeout().unwrap(), None);
    }

    #[test]
    fn custom_options_are_applied() {
        let socket = create_udp_socket().unwrap();
        let options = SocketOptions {
            reuse_addr: false,
            receive_buffer: 0,
            send_buffer: 0,
            broadcast: true,
            ttl: 17,
            receive_timeout: 2,
        };
        apply_socket_options(&socket, &options, None).unwrap();

        assert!(!socket.reuse_address().unwrap());
        assert!(socket.broadcast().unwrap());
        assert_eq!(socket.ttl().unwrap(), 17);
        assert_eq!(socket.read_timeout().unwrap(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn failing_option_is_logged_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let log = EventLog::open(&path).unwrap();

        let socket = create_udp_socket().unwrap();
        let options = SocketOptions {
            ttl: 1000,
            receive_timeout: 2,
            ..SocketOptions::default()
        };

        let err = apply_socket_options(&socket, &options, Some(&log)).unwrap_err();
        assert!(matches!(err, Error::SocketOption { option: "IP_TTL", .. }));
        // SO_RCVTIMEO comes after IP_TTL and must not have been touched.
        assert_eq!(socket.read_timeout().unwrap(), None);

        let events = crate::event_log::read_events(&path).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, EventKind::SocketError);
        assert_eq!(events[0].message, "Failed to set TTL");
    }

    #[test]
    fn bind_to_ephemeral_port() {
        let socket = create_udp_socket().unwrap();
        bind_socket(&socket, 0).unwrap();

        let local = socket.local_addr().unwrap().as_socket().unwrap();
        assert_ne!(local.port(), 0);
        assert!(local.ip().is_unspecified());
    }

    #[test]
    fn client_info_splits_address() {
        let addr: SocketAddr = "192.0.2.4:4321".parse().unwrap();
        assert_eq!(client_info(addr), ("192.0.2.4".to_string(), 4321));
    }
}
