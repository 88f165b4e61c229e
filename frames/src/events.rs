//! Event names carried in [`Frame::event`](crate::Frame::event).
//!
//! Peer-to-peer events are relayed verbatim by the server. Relay events are
//! produced by the server itself and carry no `origin`.

// =============================================================================
// TRAJECTORIES
// =============================================================================

/// Joining peer asks for the current trajectory collection. No payload.
pub const REQUEST_TRAJECTORY_STATE: &str = "requestTrajectoryState";

/// Reply to [`REQUEST_TRAJECTORY_STATE`]: `{ trajectoriesState: <string> }`.
pub const SYNC_TRAJECTORIES: &str = "syncTrajectories";

/// Full trajectory snapshot after any local trajectory edit.
pub const UPDATE_TRAJECTORIES: &str = "updateTrajectories";

// =============================================================================
// OBJECTS
// =============================================================================

/// Joining peer asks every peer for its object array. No payload.
pub const REQUEST_OBJECTS_STATE: &str = "requestObjectsState";

/// Reply to [`REQUEST_OBJECTS_STATE`]: `{ objectsState: <string> }`.
pub const SYNC_OBJECTS: &str = "syncObjects";

/// Object count changed on the sender: `{ objectsState: <string> }`.
pub const UPDATE_OBJECTS_LENGTH: &str = "updateObjectsLength";

/// Fixed-rate heartbeat of the sender's objects: `{ objectsState: <string> }`.
pub const UPDATE_VALUES_CLIENTS_OBJECTS: &str = "updateValuesClientsObjects";

// =============================================================================
// PRESENCE
// =============================================================================

/// Roster: `{ <clientId>: { color, objects } }`.
pub const CLIENT_LIST: &str = "clientList";

/// Presence display should refresh. No payload.
pub const SYNC_CLIENTS_DIV: &str = "syncClientsDiv";

/// Relay-assigned display color for the receiving peer: `{ color }`.
pub const ASSIGN_COLOR: &str = "assignColor";

// =============================================================================
// RELAY
// =============================================================================

/// Welcome frame sent to a freshly connected peer: `{ clientId }`.
pub const CONNECTED: &str = "connected";

/// A peer's socket closed: `{ clientId }`.
pub const CLIENT_DISCONNECTED: &str = "clientDisconnected";

// =============================================================================
// PAYLOAD KEYS
// =============================================================================

/// Payload key holding a serialized trajectory collection.
pub const KEY_TRAJECTORIES_STATE: &str = "trajectoriesState";

/// Payload key holding a serialized object array.
pub const KEY_OBJECTS_STATE: &str = "objectsState";

/// Payload key holding a client identifier.
pub const KEY_CLIENT_ID: &str = "clientId";

/// Payload key holding a display color.
pub const KEY_COLOR: &str = "color";

/// Roster key holding a client's last known object array.
pub const KEY_OBJECTS: &str = "objects";

/// Events that carry an object array whose slot count may have changed.
#[must_use]
pub fn is_object_structural(event: &str) -> bool {
    matches!(event, SYNC_OBJECTS | UPDATE_OBJECTS_LENGTH)
}
