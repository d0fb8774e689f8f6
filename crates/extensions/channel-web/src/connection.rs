//! WebSocket connection loops for frames and surfaces.
//!
//! Each socket gets a read/write loop and an ordered worker. The loop keeps
//! reading while the worker waits on the coordinator, so a handler that asks
//! this very frame a question still receives its answer.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use inline_menu_protocols::{FrameDetails, MessageSender, SurfacePort};

use crate::envelope::Envelope;
use crate::error::ChannelError;
use crate::port::WebSurfacePort;
use crate::WebChannelState;

/// How long a closed socket waits for its worker to finish queued messages.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Let the worker finish what was already queued; abort it past the bound.
async fn drain_worker(mut worker: JoinHandle<()>, label: &str) {
    if tokio::time::timeout(WORKER_DRAIN_TIMEOUT, &mut worker).await.is_err() {
        warn!(label, "Worker did not drain in time, aborting");
        worker.abort();
    }
}

/// Inbound frame message queued for the worker.
struct FrameJob {
    id: Option<u64>,
    payload: Value,
}

/// Drive one frame socket until either side closes it.
pub(crate) async fn run_frame_socket(
    socket: WebSocket,
    state: Arc<WebChannelState>,
    sender: MessageSender,
    details: FrameDetails,
) {
    let tab = sender.tab_id();
    let frame = sender.frame_id;
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let conn_id = state.hub.attach(tab, details, outbound_tx.clone());
    info!(%tab, %frame, "Frame connected");

    let (job_tx, job_rx) = mpsc::unbounded_channel::<FrameJob>();
    let worker = tokio::spawn(frame_worker(state.clone(), sender, job_rx, outbound_tx));

    let (mut ws_tx, mut ws_rx) = socket.split();
    let shutdown = state.shutdown.clone();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }

            Some(text) = outbound_rx.recv() => {
                if let Err(e) = ws_tx.send(Message::Text(text.into())).await {
                    warn!(%tab, %frame, error = %e, "Failed to write to frame socket");
                    break;
                }
            }

            result = ws_rx.next() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_frame_text(&state, text.as_str(), &job_tx) {
                            debug!(%tab, %frame, error = %e, "Dropping frame socket message");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(%tab, %frame, error = %e, "Frame socket error");
                        break;
                    }
                }
            }
        }
    }

    // Detaching first fails requests to this frame, so the worker cannot
    // wait on an answer that will never arrive.
    drop(job_tx);
    let detached = state.hub.detach(tab, frame, conn_id);
    drain_worker(worker, "frame").await;
    if !detached {
        return;
    }
    info!(%tab, %frame, "Frame disconnected");
    let coordinator = state.router.coordinator();
    if state.hub.has_frames(tab) {
        coordinator.frame_navigated(tab, frame).await;
    } else {
        coordinator.tab_removed(tab);
    }
}

fn handle_frame_text(
    state: &WebChannelState,
    text: &str,
    jobs: &mpsc::UnboundedSender<FrameJob>,
) -> Result<(), ChannelError> {
    let envelope = Envelope::from_text(text)
        .map_err(|e| ChannelError::ReceiveFailed(format!("Invalid envelope: {}", e)))?;
    match envelope {
        Envelope::Message { id, payload } => jobs
            .send(FrameJob { id, payload })
            .map_err(|_| ChannelError::Disconnected),
        Envelope::Response { id, payload } => {
            state.hub.resolve(id, payload);
            Ok(())
        }
        Envelope::Request { .. } | Envelope::Notify { .. } => Err(ChannelError::ReceiveFailed(
            "Frames cannot send requests or notifications".to_string(),
        )),
    }
}

async fn frame_worker(
    state: Arc<WebChannelState>,
    sender: MessageSender,
    mut jobs: mpsc::UnboundedReceiver<FrameJob>,
    outbound: mpsc::UnboundedSender<String>,
) {
    while let Some(job) = jobs.recv().await {
        let reply = state.router.route_frame(job.payload, sender.clone()).await;
        let Some(id) = job.id else {
            continue;
        };
        match (Envelope::Response { id, payload: reply }).to_text() {
            Ok(text) => {
                if outbound.send(text).is_err() {
                    break;
                }
            }
            Err(e) => warn!(id, error = %e, "Failed to encode frame reply"),
        }
    }
}

/// Drive one surface socket until either side closes it.
pub(crate) async fn run_surface_socket(
    socket: WebSocket,
    state: Arc<WebChannelState>,
    port: Arc<WebSurfacePort>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
) {
    let port_id = port.id();
    let kind = port.kind();
    state.surfaces.insert(port_id, port.clone());

    let (job_tx, job_rx) = mpsc::unbounded_channel::<Value>();
    let worker = tokio::spawn(surface_worker(state.clone(), port.clone(), job_rx));

    let (mut ws_tx, mut ws_rx) = socket.split();
    let closed = port.closed();
    let shutdown = state.shutdown.clone();
    loop {
        tokio::select! {
            _ = closed.cancelled() => {
                debug!(port = %port_id, %kind, "Closing surface socket");
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }

            _ = shutdown.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }

            Some(text) = outbound_rx.recv() => {
                if let Err(e) = ws_tx.send(Message::Text(text.into())).await {
                    warn!(port = %port_id, error = %e, "Failed to write to surface socket");
                    break;
                }
            }

            result = ws_rx.next() => {
                match result {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<Value>(text.as_str()) {
                        Ok(message) => {
                            if job_tx.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => debug!(port = %port_id, error = %e, "Dropping invalid surface message"),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(port = %port_id, error = %e, "Surface socket error");
                        break;
                    }
                }
            }
        }
    }

    drop(job_tx);
    drain_worker(worker, "surface").await;
    state.surfaces.remove(&port_id);
    state.router.coordinator().surface_disconnected(port_id);
}

async fn surface_worker(
    state: Arc<WebChannelState>,
    port: Arc<WebSurfacePort>,
    mut jobs: mpsc::UnboundedReceiver<Value>,
) {
    let port: Arc<dyn SurfacePort> = port;
    if let Err(e) = state.router.coordinator().connect_surface(port.clone()).await {
        warn!(port = %port.id(), error = %e, "Surface handshake failed");
    }
    while let Some(message) = jobs.recv().await {
        state.router.route_surface(&port, message).await;
    }
}
