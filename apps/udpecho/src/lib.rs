//! # udpecho Library
//!
//! This library exposes the udpecho modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod client;
pub mod event_log;
pub mod server;
pub mod socket;

pub use client::UdpClient;
pub use event_log::EventLog;
pub use server::{ServerStats, UdpServer};

// Re-export udpecho_core for convenience
pub use udpecho_core;
