//! # Event Records
//!
//! Every notable server action becomes one [`LogEvent`], written to the
//! event log as a JSON object:
//!
//! ```json
//! {
//!   "timestamp": "2024-05-01 12:00:00",
//!   "event": "message_received",
//!   "message": "hello",
//!   "client": { "ip": "127.0.0.1", "port": 50000 }
//! }
//! ```
//!
//! `client` is present only for events tied to a peer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Timestamp format used in event records (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Kind of event, serialized in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ServerStart,
    ServerStop,
    MessageReceived,
    MessageSent,
    Error,
    Warning,
    Timeout,
    SocketError,
}

impl EventKind {
    /// The name used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServerStart => "server_start",
            Self::ServerStop => "server_stop",
            Self::MessageReceived => "message_received",
            Self::MessageSent => "message_sent",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Timeout => "timeout",
            Self::SocketError => "socket_error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The peer an event relates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip: String,
    pub port: u16,
}

impl From<SocketAddr> for ClientInfo {
    fn from(addr: SocketAddr) -> Self {
        Self {
            ip: addr.ip().to_string(),
            port: addr.port(),
        }
    }
}

/// One entry of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: String,
    pub event: EventKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,
}

impl LogEvent {
    /// Create an event stamped with the current local time.
    #[must_use]
    pub fn new(event: EventKind, message: impl Into<String>, client: Option<ClientInfo>) -> Self {
        Self {
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            event,
            message: message.into(),
            client,
        }
    }

    #[must_use]
    pub fn server_start() -> Self {
        Self::new(EventKind::ServerStart, "Server started", None)
    }

    #[must_use]
    pub fn server_stop() -> Self {
        Self::new(EventKind::ServerStop, "Server stopped", None)
    }

    #[must_use]
    pub fn message_received(message: impl Into<String>, peer: SocketAddr) -> Self {
        Self::new(EventKind::MessageReceived, message, Some(peer.into()))
    }

    #[must_use]
    pub fn message_sent(message: impl Into<String>, peer: SocketAddr) -> Self {
        Self::new(EventKind::MessageSent, message, Some(peer.into()))
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventKind::Error, message, None)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(EventKind::Warning, message, None)
    }

    #[must_use]
    pub fn timeout() -> Self {
        Self::new(EventKind::Timeout, "Receive timeout occurred", None)
    }

    #[must_use]
    pub fn socket_error(message: impl Into<String>) -> Self {
        Self::new(EventKind::SocketError, message, None)
    }

    /// Render as indented JSON, the format of the event log.
    pub fn to_pretty_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    #[test]
    fn kind_names_match_serde() {
        for kind in [
            EventKind::ServerStart,
            EventKind::ServerStop,
            EventKind::MessageReceived,
            EventKind::MessageSent,
            EventKind::Error,
            EventKind::Warning,
            EventKind::Timeout,
            EventKind::SocketError,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn timestamp_has_expected_shape() {
        let event = LogEvent::server_start();
        assert!(chrono::NaiveDateTime::parse_from_str(&event.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn client_is_omitted_when_absent() {
        let json = serde_json::to_value(LogEvent::server_stop()).unwrap();
        assert_eq!(json["event"], "server_stop");
        assert_eq!(json["message"], "Server stopped");
        assert!(json.get("client").is_none());
    }

    #[test]
    fn client_is_nested_when_present() {
        let json = serde_json::to_value(LogEvent::message_received("hi", peer())).unwrap();
        assert_eq!(json["event"], "message_received");
        assert_eq!(json["message"], "hi");
        assert_eq!(json["client"]["ip"], "127.0.0.1");
        assert_eq!(json["client"]["port"], 50000);
    }

    #[test]
    fn keys_keep_declaration_order() {
        let text = LogEvent::message_sent("ok", peer()).to_pretty_json().unwrap();
        let ts = text.find("\"timestamp\"").unwrap();
        let ev = text.find("\"event\"").unwrap();
        let msg = text.find("\"message\"").unwrap();
        let client = text.find("\"client\"").unwrap();
        assert!(ts < ev && ev < msg && msg < client);
        assert!(text.contains("\n  \"event\": \"message_sent\""));
    }

    #[test]
    fn pretty_json_parses_back() {
        let original = LogEvent::socket_error("Failed to set TTL");
        let parsed: LogEvent = serde_json::from_str(&original.to_pretty_json().unwrap()).unwrap();
        assert_eq!(parsed, original);
    }
}
