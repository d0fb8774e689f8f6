//! HTTP server and routing.

use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use inline_menu_protocols::{
    AuthStatus, FrameDetails, FrameId, MessageSender, SurfaceKind, TabContext, TabId,
};

use crate::connection::{run_frame_socket, run_surface_socket};
use crate::port::WebSurfacePort;
use crate::WebChannelState;

/// Create the Axum router for the web channel.
pub fn create_router(state: Arc<WebChannelState>) -> Router {
    Router::new()
        .route("/frame", get(frame_socket))
        .route("/surface/{kind}", get(surface_socket))
        .route("/session", post(update_session))
        .route("/tabs/{tab_id}", delete(remove_tab))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve a surface from a short name (`button`, `list`) or its port name.
pub fn parse_surface_kind(name: &str) -> Option<SurfaceKind> {
    match name {
        "button" => Some(SurfaceKind::Button),
        "list" => Some(SurfaceKind::List),
        other => SurfaceKind::from_port_name(other),
    }
}

fn tab_context(tab_id: i64, url: Option<String>, title: Option<String>) -> TabContext {
    TabContext {
        id: TabId(tab_id),
        url,
        title,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameQuery {
    tab_id: i64,
    frame_id: i64,
    #[serde(default)]
    parent_frame_id: Option<i64>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    tab_url: Option<String>,
    #[serde(default)]
    tab_title: Option<String>,
}

impl FrameQuery {
    fn into_parts(self) -> (MessageSender, FrameDetails) {
        let frame_id = FrameId(self.frame_id);
        // The top frame has no parent whatever the query says.
        let parent_frame_id = if frame_id.is_top() {
            None
        } else {
            Some(FrameId(self.parent_frame_id.unwrap_or(0)))
        };
        let url = self.url.unwrap_or_default();
        let details = FrameDetails {
            frame_id,
            parent_frame_id,
            url: url.clone(),
        };
        let tab = tab_context(self.tab_id, self.tab_url, self.tab_title);
        let mut sender = MessageSender::new(tab, frame_id);
        if !url.is_empty() {
            sender = sender.with_url(url);
        }
        (sender, details)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SurfaceQuery {
    tab_id: i64,
    #[serde(default)]
    frame_id: i64,
    #[serde(default)]
    tab_url: Option<String>,
    #[serde(default)]
    tab_title: Option<String>,
}

/// WebSocket upgrade for a page frame.
async fn frame_socket(
    ws: WebSocketUpgrade,
    Query(query): Query<FrameQuery>,
    State(state): State<Arc<WebChannelState>>,
) -> Response {
    let (sender, details) = query.into_parts();
    debug!(tab = %sender.tab_id(), frame = %sender.frame_id, "Frame socket upgrade");
    ws.on_upgrade(move |socket| run_frame_socket(socket, state, sender, details))
}

/// WebSocket upgrade for a surface.
async fn surface_socket(
    ws: WebSocketUpgrade,
    Path(kind): Path<String>,
    Query(query): Query<SurfaceQuery>,
    State(state): State<Arc<WebChannelState>>,
) -> Response {
    let Some(kind) = parse_surface_kind(&kind) else {
        return (StatusCode::NOT_FOUND, format!("Unknown surface: {}", kind)).into_response();
    };
    let tab = tab_context(query.tab_id, query.tab_url, query.tab_title);
    let sender = MessageSender::new(tab, FrameId(query.frame_id));
    let (port, outbound_rx) = WebSurfacePort::new(state.next_port_id(), kind, sender);
    debug!(tab = query.tab_id, %kind, "Surface socket upgrade");
    ws.on_upgrade(move |socket| run_surface_socket(socket, state, Arc::new(port), outbound_rx))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionUpdate {
    auth_status: AuthStatus,
}

/// The vault session changed.
async fn update_session(
    State(state): State<Arc<WebChannelState>>,
    Json(update): Json<SessionUpdate>,
) -> impl IntoResponse {
    let status = update.auth_status;
    let changed = state.session.set(status);
    if changed {
        state.router.coordinator().auth_status_changed(status).await;
    }
    Json(json!({ "authStatus": status, "changed": changed }))
}

/// The browser closed a tab.
async fn remove_tab(
    State(state): State<Arc<WebChannelState>>,
    Path(tab_id): Path<i64>,
) -> StatusCode {
    info!(tab = tab_id, "Tab closed");
    state.router.coordinator().tab_removed(TabId(tab_id));
    StatusCode::NO_CONTENT
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<WebChannelState>>) -> impl IntoResponse {
    Json(json!({
        "status": if state.shutdown.is_cancelled() { "stopping" } else { "ok" },
        "frames": state.hub.frame_count(),
        "surfaces": state.surfaces.len(),
        "authStatus": state.session.get(),
    }))
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
