//! # Inline Menu Channel - Web
//!
//! WebSocket host connecting page frames and inline menu surfaces to the
//! coordinator.
//!
//! - `GET /frame?tabId&frameId&parentFrameId&url&tabUrl&tabTitle` upgrades a
//!   page frame. Frames talk in [`Envelope`]s.
//! - `GET /surface/{button|list}?tabId&frameId&tabUrl` upgrades a surface.
//!   Surfaces send bare signed messages and receive bare commands.
//! - `POST /session` reports a vault session change.
//! - `DELETE /tabs/{tabId}` reports a closed tab.
//! - `GET /health` reports connection counts.
//!
//! ## Usage
//!
//! ```ignore
//! let hub = Arc::new(FrameHub::new(config.server.request_timeout()));
//! let session = Arc::new(SessionStatus::new(AuthStatus::Locked));
//! // build the coordinator with `hub` as its frame messenger and `session` as its auth provider
//! let state = Arc::new(WebChannelState::new(hub, CommandRouter::new(coordinator), session));
//! let channel = WebChannel::new(config.server.clone(), state);
//! channel.run().await?;
//! ```

mod connection;
mod envelope;
mod error;
mod hub;
mod port;
mod server;
mod session;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use inline_menu_config::ServerConfig;
use inline_menu_core::CommandRouter;
use inline_menu_protocols::{PortId, SurfacePort};

pub use envelope::Envelope;
pub use error::ChannelError;
pub use hub::FrameHub;
pub use port::WebSurfacePort;
pub use server::{create_router, parse_surface_kind};
pub use session::SessionStatus;

/// State shared across handlers.
pub struct WebChannelState {
    pub hub: Arc<FrameHub>,
    pub router: CommandRouter,
    pub session: Arc<SessionStatus>,
    /// Connected surface sockets.
    pub surfaces: DashMap<PortId, Arc<WebSurfacePort>>,
    next_port: AtomicU64,
    /// Cancelled when the channel stops; every socket loop exits.
    pub shutdown: CancellationToken,
}

impl WebChannelState {
    pub fn new(hub: Arc<FrameHub>, router: CommandRouter, session: Arc<SessionStatus>) -> Self {
        Self {
            hub,
            router,
            session,
            surfaces: DashMap::new(),
            next_port: AtomicU64::new(1),
            shutdown: CancellationToken::new(),
        }
    }

    pub(crate) fn next_port_id(&self) -> PortId {
        PortId(self.next_port.fetch_add(1, Ordering::SeqCst))
    }
}

/// The web channel: binds the listener and serves until stopped.
pub struct WebChannel {
    config: ServerConfig,
    state: Arc<WebChannelState>,
}

impl WebChannel {
    pub fn new(config: ServerConfig, state: Arc<WebChannelState>) -> Self {
        Self { config, state }
    }

    /// The channel's listen address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    pub fn state(&self) -> Arc<WebChannelState> {
        self.state.clone()
    }

    pub fn connection_count(&self) -> usize {
        self.state.hub.frame_count() + self.state.surfaces.len()
    }

    pub async fn bind(&self) -> Result<TcpListener, ChannelError> {
        let addr: std::net::SocketAddr = self
            .address()
            .parse()
            .map_err(|e| ChannelError::ConnectionFailed(format!("Invalid address: {}", e)))?;
        TcpListener::bind(addr)
            .await
            .map_err(|e| ChannelError::ConnectionFailed(format!("Failed to bind: {}", e)))
    }

    /// Bind the configured address and serve until [`WebChannel::stop`].
    pub async fn run(&self) -> Result<(), ChannelError> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until [`WebChannel::stop`].
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ChannelError> {
        let local = listener.local_addr()?;
        info!("Inline menu host listening on http://{}", local);
        let router = create_router(self.state.clone());
        let shutdown = self.state.shutdown.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;
        Ok(())
    }

    /// Disconnect every surface and stop serving.
    pub fn stop(&self) {
        for entry in self.state.surfaces.iter() {
            entry.value().disconnect();
        }
        self.state.shutdown.cancel();
        info!("Inline menu host stopping");
    }
}


#[cfg(test)]
pub(crate) mod testing;
