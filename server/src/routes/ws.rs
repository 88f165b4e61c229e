//! WebSocket handler: frame relay between peers.
//!
//! DESIGN
//! ======
//! On upgrade, mints a client id, registers the client and enters a
//! `select!` loop:
//! - Incoming client frames: stamp `origin`, remember structural object
//!   payloads, relay to every other client
//! - Frames queued for this client by others: forward to the socket
//!
//! Inbound frames may be protobuf (binary) or JSON (text). Outbound frames
//! use protobuf unless the client connected with `?wire=json`.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade: send `connected { clientId }`, then `assignColor { color }`,
//!    then broadcast the roster to everyone
//! 2. Relay frames until the socket closes
//! 3. Close: part, broadcast `clientDisconnected { clientId }` and the roster

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use frames::{Frame, decode_frame, encode_frame, events};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::relay;
use crate::state::RelayState;

/// Outbound encoding for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wire {
    Protobuf,
    Json,
}

#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    wire: Option<String>,
}

impl WsParams {
    fn wire(&self) -> Wire {
        match self.wire.as_deref() {
            Some("json") => Wire::Json,
            _ => Wire::Protobuf,
        }
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<RelayState>, Query(params): Query<WsParams>, ws: WebSocketUpgrade) -> Response {
    let wire = params.wire();
    ws.on_upgrade(move |socket| run_ws(socket, state, wire))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: RelayState, wire: Wire) {
    let client_id = Uuid::new_v4().to_string();

    // Per-connection channel for frames relayed from peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.channel_capacity);
    let color = relay::join(&state, &client_id, client_tx).await;

    let welcome = Frame::event(events::CONNECTED, json!({ events::KEY_CLIENT_ID: client_id }));
    let assign = Frame::event(events::ASSIGN_COLOR, json!({ events::KEY_COLOR: color }));
    for frame in [welcome, assign] {
        if send_frame(&mut socket, wire, &frame).await.is_err() {
            leave(&state, &client_id).await;
            return;
        }
    }
    info!(%client_id, %color, ?wire, "ws: client connected");
    relay::broadcast_roster(&state).await;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Binary(bytes) => match decode_frame(&bytes) {
                        Ok(frame) => relay_inbound(&state, &client_id, frame).await,
                        Err(e) => warn!(%client_id, error = %e, "ws: undecodable binary frame"),
                    },
                    Message::Text(text) => match serde_json::from_str::<Frame>(text.as_str()) {
                        Ok(frame) => relay_inbound(&state, &client_id, frame).await,
                        Err(e) => warn!(%client_id, error = %e, "ws: invalid json frame"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, wire, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    leave(&state, &client_id).await;
    info!(%client_id, "ws: client disconnected");
}

/// Stamp, remember and fan out one frame from `client_id`.
async fn relay_inbound(state: &RelayState, client_id: &str, frame: Frame) {
    let frame = frame.with_origin(client_id);
    relay::record_objects(state, client_id, &frame).await;
    let delivered = relay::broadcast(state, &frame, Some(client_id)).await;
    debug!(%client_id, event = %frame.event, delivered, "ws: relayed");
}

/// Part the client and tell everyone else. Safe to call more than once.
async fn leave(state: &RelayState, client_id: &str) {
    if !relay::part(state, client_id).await {
        return;
    }
    let notice = Frame::event(events::CLIENT_DISCONNECTED, json!({ events::KEY_CLIENT_ID: client_id }));
    relay::broadcast(state, &notice, None).await;
    relay::broadcast_roster(state).await;
}

async fn send_frame(socket: &mut WebSocket, wire: Wire, frame: &Frame) -> Result<(), axum::Error> {
    let message = match wire {
        Wire::Protobuf => Message::Binary(encode_frame(frame).into()),
        Wire::Json => match serde_json::to_string(frame) {
            Ok(text) => Message::Text(text.into()),
            Err(e) => {
                warn!(event = %frame.event, error = %e, "ws: failed to serialize frame");
                return Ok(());
            }
        },
    };
    socket.send(message).await
}
