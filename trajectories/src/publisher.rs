//! Outbound change publishing.
//!
//! DESIGN
//! ======
//! Two independent streams leave a peer:
//!
//! - Structural snapshots (trajectory edits, object count changes) go out on a
//!   trailing debounce so a burst of edits (a control-point drag, say)
//!   becomes one frame.
//! - A heartbeat of the local object array goes out at a fixed period whether
//!   or not anything changed. It is never debounced.
//!
//! The publisher is clock-driven by the caller: every method takes `now`, so
//! the same code runs under a tokio interval and in tests.
//!
//! Every outbound frame carries the local client id as `origin`, and
//! [`ChangePublisher::is_echo`] is the one guard inbound handling uses to drop
//! a peer's own broadcasts.

#[cfg(test)]
#[path = "publisher_test.rs"]
mod publisher_test;

use std::time::{Duration, Instant};

use frames::{Frame, events};
use tracing::{debug, warn};

use crate::codec::{StateError, encode_objects, encode_trajectories};
use crate::consts::{DEFAULT_DEBOUNCE_MS, DEFAULT_HEARTBEAT_MS};
use crate::model::{AnimatedObject, Slots, Trajectory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishConfig {
    /// Trailing debounce window for structural snapshots.
    pub debounce: Duration,
    /// Heartbeat period.
    pub heartbeat: Duration,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            heartbeat: Duration::from_millis(DEFAULT_HEARTBEAT_MS),
        }
    }
}

/// Which collection a structural edit touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structural {
    Trajectories,
    Objects,
}

#[derive(Debug)]
pub struct ChangePublisher {
    config: PublishConfig,
    origin: Option<String>,
    trajectories_due: Option<Instant>,
    objects_due: Option<Instant>,
    next_heartbeat: Option<Instant>,
}

impl ChangePublisher {
    #[must_use]
    pub fn new(config: PublishConfig) -> Self {
        Self { config, origin: None, trajectories_due: None, objects_due: None, next_heartbeat: None }
    }

    /// Adopt the relay-assigned client id and start the heartbeat.
    pub fn set_origin(&mut self, client_id: &str, now: Instant) {
        self.origin = Some(client_id.to_owned());
        self.next_heartbeat = Some(now + self.config.heartbeat);
    }

    /// Forget the client id; nothing is published until a new one arrives.
    pub fn clear_origin(&mut self) {
        self.origin = None;
        self.next_heartbeat = None;
    }

    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// True when `frame` is this peer's own broadcast coming back.
    #[must_use]
    pub fn is_echo(&self, frame: &Frame) -> bool {
        self.origin.as_deref().is_some_and(|id| frame.is_from(id))
    }

    /// Record a structural edit. Restarts that collection's debounce window.
    pub fn mark(&mut self, change: Structural, now: Instant) {
        let due = Some(now + self.config.debounce);
        match change {
            Structural::Trajectories => self.trajectories_due = due,
            Structural::Objects => self.objects_due = due,
        }
    }

    #[must_use]
    pub fn is_pending(&self, change: Structural) -> bool {
        match change {
            Structural::Trajectories => self.trajectories_due.is_some(),
            Structural::Objects => self.objects_due.is_some(),
        }
    }

    /// Emit every frame that is due at `now`.
    pub fn poll(&mut self, now: Instant, trajectories: &[Trajectory], objects: &Slots<AnimatedObject>) -> Vec<Frame> {
        let Some(origin) = self.origin.clone() else {
            return Vec::new();
        };
        let mut out = Vec::new();

        if self.trajectories_due.is_some_and(|due| due <= now) {
            self.trajectories_due = None;
            push_frame(&mut out, trajectories_frame(events::UPDATE_TRAJECTORIES, trajectories), &origin);
        }
        if self.objects_due.is_some_and(|due| due <= now) {
            self.objects_due = None;
            push_frame(&mut out, objects_frame(events::UPDATE_OBJECTS_LENGTH, objects), &origin);
        }
        if let Some(next) = self.next_heartbeat
            && next <= now
        {
            let mut following = next + self.config.heartbeat;
            if following <= now {
                // Fell behind (stalled loop): resume the cadence instead of bursting.
                following = now + self.config.heartbeat;
            }
            self.next_heartbeat = Some(following);
            push_frame(&mut out, objects_frame(events::UPDATE_VALUES_CLIENTS_OBJECTS, objects), &origin);
        }

        out
    }
}

/// Build a frame carrying the serialized trajectory collection.
///
/// # Errors
///
/// Returns [`StateError`] if serialization fails.
pub fn trajectories_frame(event: &str, trajectories: &[Trajectory]) -> Result<Frame, StateError> {
    let state = encode_trajectories(trajectories)?;
    Ok(Frame::event(event, serde_json::json!({ events::KEY_TRAJECTORIES_STATE: state })))
}

/// Build a frame carrying the serialized object array.
///
/// # Errors
///
/// Returns [`StateError`] if serialization fails.
pub fn objects_frame(event: &str, objects: &Slots<AnimatedObject>) -> Result<Frame, StateError> {
    let state = encode_objects(objects)?;
    Ok(Frame::event(event, serde_json::json!({ events::KEY_OBJECTS_STATE: state })))
}

fn push_frame(out: &mut Vec<Frame>, frame: Result<Frame, StateError>, origin: &str) {
    match frame {
        Ok(frame) => {
            debug!(event = %frame.event, "publish");
            out.push(frame.with_origin(origin));
        }
        Err(e) => warn!(error = %e, "publish: failed to serialize state"),
    }
}
