//! Relay service: join/part, roster, and best-effort fan-out.
//!
//! DESIGN
//! ======
//! The relay never interprets document state. Frames are forwarded to every
//! other client unchanged apart from the `origin` stamp. Delivery is
//! at-most-once: a client whose channel is full simply misses the frame and
//! recovers from the next heartbeat or snapshot.
//!
//! The one thing the relay remembers per client is the object array from its
//! last structural announcement, so the roster can seed peers that join later.

#[cfg(test)]
#[path = "relay_test.rs"]
mod relay_test;

use std::collections::HashMap;

use frames::{Frame, events};
use serde_json::{Map, Value, json};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::services::palette;
use crate::state::{ConnectedClient, RelayState};

// =============================================================================
// MEMBERSHIP
// =============================================================================

/// Register a client and return its assigned display color.
pub async fn join(state: &RelayState, client_id: &str, tx: mpsc::Sender<Frame>) -> String {
    let mut clients = state.clients.write().await;
    let color = {
        let in_use: Vec<&str> = clients.values().map(|c| c.color.as_str()).collect();
        palette::pick_color(&in_use, &mut rand::rng()).to_owned()
    };
    clients.insert(client_id.to_owned(), ConnectedClient::new(tx, color.clone()));
    info!(%client_id, %color, clients = clients.len(), "relay: client joined");
    color
}

/// Remove a client. Returns whether it was present; removing twice is a no-op.
pub async fn part(state: &RelayState, client_id: &str) -> bool {
    let mut clients = state.clients.write().await;
    let removed = clients.remove(client_id).is_some();
    if removed {
        info!(%client_id, remaining = clients.len(), "relay: client left");
    }
    removed
}

// =============================================================================
// FAN-OUT
// =============================================================================

/// Send `frame` to every client except `exclude`. Returns how many accepted it.
pub async fn broadcast(state: &RelayState, frame: &Frame, exclude: Option<&str>) -> usize {
    let clients = state.clients.read().await;
    fan_out(&clients, frame, exclude)
}

fn fan_out(clients: &HashMap<String, ConnectedClient>, frame: &Frame, exclude: Option<&str>) -> usize {
    let mut delivered = 0;
    for (client_id, client) in clients.iter() {
        if exclude == Some(client_id.as_str()) {
            continue;
        }
        match client.tx.try_send(frame.clone()) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => {
                debug!(%client_id, event = %frame.event, "relay: channel full, frame dropped");
            }
            // The socket task is already tearing down; its part will follow.
            Err(TrySendError::Closed(_)) => {}
        }
    }
    delivered
}

/// Current roster: `{ <clientId>: { color, objects } }`.
pub async fn roster(state: &RelayState) -> Frame {
    let clients = state.clients.read().await;
    roster_frame(&clients)
}

fn roster_frame(clients: &HashMap<String, ConnectedClient>) -> Frame {
    let entries: Map<String, Value> = clients
        .iter()
        .map(|(client_id, client)| {
            let entry = json!({ events::KEY_COLOR: client.color, events::KEY_OBJECTS: client.objects });
            (client_id.clone(), entry)
        })
        .collect();
    Frame::event(events::CLIENT_LIST, Value::Object(entries))
}

/// Broadcast the roster to everyone. Built and sent under one read guard, so
/// membership cannot change in between and rosters reach each client in
/// membership order.
pub async fn broadcast_roster(state: &RelayState) -> usize {
    let clients = state.clients.read().await;
    let frame = roster_frame(&clients);
    fan_out(&clients, &frame, None)
}

// =============================================================================
// OBJECT MEMORY
// =============================================================================

/// Remember the object array carried by a structural object frame. Returns
/// whether anything was recorded.
pub async fn record_objects(state: &RelayState, client_id: &str, frame: &Frame) -> bool {
    if !events::is_object_structural(&frame.event) {
        return false;
    }
    let objects = match frame.data.get(events::KEY_OBJECTS_STATE) {
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed @ Value::Array(_)) => parsed,
            Ok(_) => {
                warn!(%client_id, "relay: objectsState is not an array");
                return false;
            }
            Err(e) => {
                warn!(%client_id, error = %e, "relay: objectsState is not JSON");
                return false;
            }
        },
        Some(inline @ Value::Array(_)) => inline.clone(),
        _ => return false,
    };

    let mut clients = state.clients.write().await;
    let Some(client) = clients.get_mut(client_id) else {
        return false;
    };
    client.objects = objects;
    true
}
