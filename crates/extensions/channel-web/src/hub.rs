//! Registry of connected page frames and the request/response table.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use inline_menu_protocols::{FrameDetails, FrameError, FrameId, FrameMessenger, FrameRequest, TabId};

use crate::envelope::Envelope;

/// Outbound half of one frame socket.
struct FrameConnection {
    conn_id: u64,
    details: FrameDetails,
    tx: mpsc::UnboundedSender<String>,
}

/// Request waiting for the page's answer.
struct PendingRequest {
    tab: TabId,
    frame: FrameId,
    tx: oneshot::Sender<Option<Value>>,
}

/// Frames currently connected, keyed by tab and frame.
pub struct FrameHub {
    frames: DashMap<(TabId, FrameId), FrameConnection>,
    pending: DashMap<u64, PendingRequest>,
    request_id: AtomicU64,
    conn_id: AtomicU64,
    request_timeout: Duration,
}

impl FrameHub {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            frames: DashMap::new(),
            pending: DashMap::new(),
            request_id: AtomicU64::new(1),
            conn_id: AtomicU64::new(1),
            request_timeout,
        }
    }

    /// Register a frame socket. A reconnect of the same frame replaces the
    /// previous connection. Returns the connection id used to detach.
    pub fn attach(&self, tab: TabId, details: FrameDetails, tx: mpsc::UnboundedSender<String>) -> u64 {
        let conn_id = self.conn_id.fetch_add(1, Ordering::SeqCst);
        let frame = details.frame_id;
        if self
            .frames
            .insert((tab, frame), FrameConnection { conn_id, details, tx })
            .is_some()
        {
            debug!(%tab, %frame, "Frame reconnected, replacing previous socket");
        }
        conn_id
    }

    /// Forget a frame socket. Requests in flight to it fail with
    /// [`FrameError::ChannelClosed`]. Returns false when a newer socket
    /// already replaced this one.
    pub fn detach(&self, tab: TabId, frame: FrameId, conn_id: u64) -> bool {
        let removed = self
            .frames
            .remove_if(&(tab, frame), |_, connection| connection.conn_id == conn_id)
            .is_some();
        if removed {
            self.pending
                .retain(|_, request| !(request.tab == tab && request.frame == frame));
        }
        removed
    }

    /// Complete a pending request. Returns false for unknown or late answers.
    pub fn resolve(&self, id: u64, payload: Option<Value>) -> bool {
        match self.pending.remove(&id) {
            Some((_, request)) => request.tx.send(payload).is_ok(),
            None => {
                trace!(id, "Answer for unknown request");
                false
            }
        }
    }

    pub fn has_frames(&self, tab: TabId) -> bool {
        self.frames.iter().any(|entry| entry.key().0 == tab)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn send(&self, tab: TabId, frame: FrameId, envelope: &Envelope) -> Result<(), FrameError> {
        let text = envelope.to_text()?;
        let connection = self.frames.get(&(tab, frame)).ok_or(FrameError::Detached {
            tab: tab.0,
            frame: frame.0,
        })?;
        connection
            .tx
            .send(text)
            .map_err(|e| FrameError::SendFailed(e.to_string()))
    }
}

#[async_trait]
impl FrameMessenger for FrameHub {
    async fn request(
        &self,
        tab: TabId,
        frame: FrameId,
        request: FrameRequest,
    ) -> Result<Option<Value>, FrameError> {
        let command = request.command_name();
        let payload = serde_json::to_value(&request)?;
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, PendingRequest { tab, frame, tx });
        if let Err(e) = self.send(tab, frame, &Envelope::Request { id, payload }) {
            self.pending.remove(&id);
            return Err(e);
        }
        trace!(%tab, %frame, id, command, "Frame request sent");

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(_)) => Err(FrameError::ChannelClosed),
            Err(_) => {
                self.pending.remove(&id);
                Err(FrameError::Timeout(command.to_string()))
            }
        }
    }

    async fn notify(&self, tab: TabId, frame: FrameId, request: FrameRequest) -> Result<(), FrameError> {
        let payload = serde_json::to_value(&request)?;
        self.send(tab, frame, &Envelope::Notify { payload })
    }

    async fn frame_details(&self, tab: TabId, frame: FrameId) -> Option<FrameDetails> {
        self.frames
            .get(&(tab, frame))
            .map(|connection| connection.details.clone())
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
