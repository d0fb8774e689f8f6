//! CLI definitions for the inline menu host.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inline menu host CLI.
#[derive(Debug, Parser)]
#[command(name = "inline-menu")]
#[command(about = "Background coordinator for the autofill inline menu")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path. Defaults to the platform config directory.
    #[arg(short, long, global = true, env = "INLINE_MENU_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Run the host in foreground (default)
    Run {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate the configuration and exit
    CheckConfig,
}
