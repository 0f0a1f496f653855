use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use udpecho::cli;

#[derive(Parser)]
#[command(name = "udpecho")]
#[command(about = "UDP request/reply server and client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server until Ctrl-C
    Serve {
        /// Path to the YAML configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },

    /// Send one message and print the reply
    Send {
        /// Server IPv4 address
        server_ip: Option<String>,

        /// Server port
        server_port: Option<String>,

        /// Message to send
        message: Option<String>,
    },

    /// Print the effective server configuration
    Config {
        /// Path to the YAML configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Serve { config } => cli::cmd_serve(&config).await.map(|_| ()),
        Commands::Send {
            server_ip,
            server_port,
            message,
        } => match cli::client_config_from_args(server_ip.as_deref(), server_port.as_deref()) {
            Ok(config) => cli::cmd_send(config, message.as_deref()).await.map(|_| ()),
            Err(e) => Err(e),
        },
        Commands::Config { config, json } => cli::cmd_config(&config, json).map(|text| {
            println!("{}", text);
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
