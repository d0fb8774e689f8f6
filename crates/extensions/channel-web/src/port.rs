//! Surface ports backed by a WebSocket.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use inline_menu_protocols::{MessageSender, PortId, SurfaceCommand, SurfaceKind, SurfacePort};

pub struct WebSurfacePort {
    id: PortId,
    kind: SurfaceKind,
    sender: MessageSender,
    tx: mpsc::UnboundedSender<String>,
    closed: CancellationToken,
}

impl WebSurfacePort {
    /// Create a port and the receiver its socket loop drains.
    pub fn new(
        id: PortId,
        kind: SurfaceKind,
        sender: MessageSender,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let port = Self {
            id,
            kind,
            sender,
            tx,
            closed: CancellationToken::new(),
        };
        (port, rx)
    }

    /// Cancelled once the coordinator disconnects this port.
    pub fn closed(&self) -> CancellationToken {
        self.closed.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

impl SurfacePort for WebSurfacePort {
    fn id(&self) -> PortId {
        self.id
    }

    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn sender(&self) -> &MessageSender {
        &self.sender
    }

    fn post(&self, command: SurfaceCommand) {
        if self.is_closed() {
            return;
        }
        match serde_json::to_string(&command) {
            Ok(text) => {
                // The socket loop may already be gone; posting is fire-and-forget.
                let _ = self.tx.send(text);
            }
            Err(e) => warn!(port = %self.id, command = command.command_name(), error = %e, "Failed to encode surface command"),
        }
    }

    fn disconnect(&self) {
        self.closed.cancel();
    }
}
