//! Inline menu host.
//!
//! Main entry point: loads the configuration, installs tracing and serves the
//! coordinator over WebSockets.

mod adapters;
mod cli;
mod server;

use clap::Parser;
use tracing::{info, warn};

use inline_menu_config::{ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};
use crate::server::{init_tracing, run_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = ConfigLoader::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::CheckConfig) => {
            let result = ConfigValidator::validate(&config);
            for warning in &result.warnings {
                println!("warning: {}: {}", warning.path, warning.message);
            }
            for error in &result.errors {
                println!("error: {}: {}", error.path, error.message);
            }
            result.into_result()?;
            println!("Configuration OK");
            Ok(())
        }
        Some(Commands::Run { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            start(config).await
        }
        None => start(config).await,
    }
}

async fn start(config: inline_menu_config::Config) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&config.logging)?;

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    validation.into_result()?;

    info!("Starting inline menu host v{}", env!("CARGO_PKG_VERSION"));
    run_server(config).await
}
