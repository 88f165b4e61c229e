//! Shared relay state.
//!
//! DESIGN
//! ======
//! `RelayState` is injected into Axum handlers via the `State` extractor. The
//! relay holds no document state: only the set of connected clients, each
//! with its outbound channel, display color, and the last object array it
//! announced structurally (so the roster can seed late joiners).

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::collections::HashMap;
use std::sync::Arc;

use frames::Frame;
use serde_json::Value;
use tokio::sync::{RwLock, mpsc};

/// One live websocket connection.
#[derive(Debug, Clone)]
pub struct ConnectedClient {
    pub tx: mpsc::Sender<Frame>,
    pub color: String,
    /// Last structurally announced object array, `[]` until one arrives.
    pub objects: Value,
}

impl ConnectedClient {
    #[must_use]
    pub fn new(tx: mpsc::Sender<Frame>, color: String) -> Self {
        Self { tx, color, objects: Value::Array(Vec::new()) }
    }
}

/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct RelayState {
    pub clients: Arc<RwLock<HashMap<String, ConnectedClient>>>,
    pub channel_capacity: usize,
}

impl RelayState {
    #[must_use]
    pub fn new(channel_capacity: usize) -> Self {
        Self { clients: Arc::new(RwLock::new(HashMap::new())), channel_capacity: channel_capacity.max(1) }
    }
}
