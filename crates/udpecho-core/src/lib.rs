//! # udpecho-core
//!
//! The pure half of udpecho: everything that can be decided without a socket.
//!
//! - [`config`]: server configuration, YAML loading and validation
//! - [`client`]: client-side settings and address validation
//! - [`event`]: JSON event records written to the server's event log
//! - [`data`]: the reply-sourcing seam used by the server
//!
//! The network half (sockets, runtime, CLI) lives in `apps/udpecho`.

pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod event;

pub use client::{ClientConfig, DEFAULT_CLIENT_MESSAGE, parse_port_or_default};
pub use config::{LoggingConfig, ServerConfig, ServerSection, SocketOptions, load_config};
pub use data::{DataSource, DefaultData, StaticResponse, process_data};
pub use error::{Error, Result};
pub use event::{ClientInfo, EventKind, LogEvent};
