//! # CLI Commands
//!
//! The bodies of the `udpecho` subcommands. `main.rs` only parses
//! arguments and maps results to an exit code.

use std::path::Path;

use tracing::{info, warn};
use udpecho_core::config::DEFAULT_PORT;
use udpecho_core::{
    ClientConfig, DEFAULT_CLIENT_MESSAGE, Error, Result, ServerConfig, StaticResponse,
    load_config, parse_port_or_default,
};

use crate::client::UdpClient;
use crate::server::{ServerStats, UdpServer};

// =============================================================================
// SERVE
// =============================================================================

/// Load the configuration and serve until Ctrl-C.
pub async fn cmd_serve(config_path: &Path) -> Result<ServerStats> {
    let config = load_config(config_path)?;
    info!("{}", config);

    let reply = StaticResponse::new(config.server.response_message.clone());
    let server = UdpServer::bind(config, reply).await?;
    Ok(server.run().await)
}

// =============================================================================
// SEND
// =============================================================================

/// Build the client configuration from optional positional arguments.
///
/// A port that is not in `1..=65535` falls back to the default with a
/// warning. An address that is not IPv4 is an error.
pub fn client_config_from_args(
    server_ip: Option<&str>,
    server_port: Option<&str>,
) -> Result<ClientConfig> {
    let mut config = ClientConfig::default();
    let ip = server_ip
        .map(str::to_string)
        .unwrap_or_else(|| config.server_ip.to_string());

    let port = match server_port {
        None => DEFAULT_PORT,
        Some(text) => parse_port_or_default(text).unwrap_or_else(|| {
            warn!(
                "Invalid port number '{}'. Using default port {}.",
                text, DEFAULT_PORT
            );
            DEFAULT_PORT
        }),
    };

    config.set_server_address(&ip, i64::from(port))?;
    Ok(config)
}

/// Send one message and return the reply.
pub async fn cmd_send(config: ClientConfig, message: Option<&str>) -> Result<String> {
    let message = message.unwrap_or(DEFAULT_CLIENT_MESSAGE);
    let client = UdpClient::new(config).await?;

    println!(
        "Sending message to {}: \"{}\"",
        client.config().server_addr(),
        message
    );

    match client.send_and_receive(message).await {
        Ok(reply) => {
            println!("Response from server: \"{}\"", reply);
            Ok(reply)
        }
        Err(Error::Timeout(secs)) => {
            eprintln!("Timeout waiting for response");
            Err(Error::Timeout(secs))
        }
        Err(e) => {
            eprintln!("Failed to receive response: {}", e);
            Err(e)
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Load, validate and render the effective configuration.
pub fn cmd_config(config_path: &Path, json: bool) -> Result<String> {
    let config: ServerConfig = load_config(config_path)?;
    if json {
        Ok(serde_json::to_string_pretty(&config)?)
    } else {
        Ok(config.to_string())
    }
}
