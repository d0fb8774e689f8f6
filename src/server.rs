//! Tracing setup and server startup.

use std::sync::Arc;

use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use inline_menu_channel_web::{FrameHub, SessionStatus, WebChannel, WebChannelState};
use inline_menu_config::{Config, ConfigLoader, LoggingConfig};
use inline_menu_core::{Collaborators, CommandRouter, Coordinator, CoordinatorSettings};

use crate::adapters::{
    initial_auth_status, ConfiguredSettings, JsonCredentialProvider, LoggingAutofill,
    LoggingVaultPopouts,
};

/// Initialize tracing with console output and, when a log directory is
/// configured, a daily rolling file.
///
/// `RUST_LOG` overrides `[logging].level`.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = match &logging.directory {
        Some(directory) => {
            let log_dir = ConfigLoader::expand_path(&directory.to_string_lossy());
            std::fs::create_dir_all(&log_dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("inline-menu")
                .filename_suffix("log")
                .max_log_files(14)
                .build(&log_dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // The guard flushes on drop; it must live as long as the process.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(file_layer)
        .init();

    Ok(())
}

/// Wire the coordinator to the web channel and serve until Ctrl-C.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let hub = Arc::new(FrameHub::new(config.server.request_timeout()));
    let session = Arc::new(SessionStatus::new(initial_auth_status(&config.vault)?));
    let credentials = JsonCredentialProvider::from_config(&config.vault)?;
    info!(count = credentials.len(), "Credentials loaded");

    let collaborators = Collaborators {
        auth: session.clone(),
        credentials: Arc::new(credentials),
        settings: Arc::new(ConfiguredSettings::new(config.appearance.clone())),
        autofill: Arc::new(LoggingAutofill),
        popouts: Arc::new(LoggingVaultPopouts),
        frames: hub.clone(),
    };
    let coordinator = Coordinator::new(CoordinatorSettings::from_config(&config), collaborators);
    let state = Arc::new(WebChannelState::new(hub, CommandRouter::new(coordinator), session));
    let channel = Arc::new(WebChannel::new(config.server.clone(), state));

    {
        let channel = channel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => {
                    error!("Failed to listen for shutdown signal: {}", e);
                    return;
                }
            }
            channel.stop();
        });
    }

    channel.run().await?;
    info!("Inline menu host stopped");
    Ok(())
}
