//! One peer's complete synchronization state.
//!
//! DESIGN
//! ======
//! All shared state lives in a single owned [`SessionState`]: the local
//! trajectory collection, the local object slots, the registry of remote peers
//! with their shadow objects, the blender, the publisher and the scene. It is
//! driven from one event loop through three kinds of input:
//!
//! - inbound frames ([`SessionState::handle_frame`])
//! - the fixed-rate tick ([`SessionState::tick`])
//! - local edits (the `add_*`, `remove_*` and `apply_*` methods)
//!
//! Every method returns the frames to send instead of sending them, so the
//! transport stays outside and tests can wire peers together by hand.
//!
//! Structural and value messages for the same peer may arrive in any order.
//! They are routed to [`reconcile_structure`] and [`reconcile_values`]
//! respectively, which cannot undo each other.
//!
//! Join handshake: on `connected` the peer asks for both states and starts
//! awaiting a trajectory sync. The relay fans every reply out to the whole
//! room, so a `syncTrajectories` is only applied while awaiting, and the first
//! one applied ends the wait. A local trajectory edit or an applied
//! `updateTrajectories` also ends it: the collection is then at least as fresh
//! as any join reply still in flight. Peers with no trajectories stay silent
//! when asked so an empty reply cannot win the race against a real one.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::time::Instant;

use frames::{Frame, events};
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::animate::advance_all;
use crate::blend::MotionBlender;
use crate::codec::{
    ObjectSnapshot, StateError, TrajectorySnapshot, decode_objects, decode_objects_value, decode_trajectories,
    decode_trajectories_value,
};
use crate::command::{CommandError, ObjectCommand, ObjectField, TrajectoryCommand, edit_trajectory};
use crate::config::SyncConfig;
use crate::consts::DEFAULT_COLOR;
use crate::lifecycle::{despawn_shadow, reconcile_structure, reconcile_values, remint_marker};
use crate::model::{AnimatedObject, Slots, Trajectory};
use crate::publisher::{ChangePublisher, Structural, objects_frame, trajectories_frame};
use crate::reconcile::{rebuild_points, reconcile_trajectories, release_points};
use crate::registry::{ClientPatch, ClientRegistry};
use crate::scene::Scene;

pub struct SessionState<S: Scene> {
    scene: S,
    blender: MotionBlender,
    publisher: ChangePublisher,
    trajectories: Vec<Trajectory>,
    objects: Slots<AnimatedObject>,
    registry: ClientRegistry,
    color: Option<String>,
    awaiting_trajectory_sync: bool,
    presence_changed: bool,
}

impl<S: Scene> SessionState<S> {
    #[must_use]
    pub fn new(config: SyncConfig, scene: S) -> Self {
        Self {
            scene,
            blender: MotionBlender::new(config.blend),
            publisher: ChangePublisher::new(config.publish),
            trajectories: Vec::new(),
            objects: Vec::new(),
            registry: ClientRegistry::new(),
            color: None,
            awaiting_trajectory_sync: false,
            presence_changed: false,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn scene(&self) -> &S {
        &self.scene
    }

    #[must_use]
    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    #[must_use]
    pub fn objects(&self) -> &Slots<AnimatedObject> {
        &self.objects
    }

    #[must_use]
    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Relay-assigned id, once connected.
    #[must_use]
    pub fn local_id(&self) -> Option<&str> {
        self.publisher.origin()
    }

    /// Relay-assigned display color, once received.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Whether the presence display should refresh. Reading clears the flag.
    pub fn take_presence_changed(&mut self) -> bool {
        std::mem::take(&mut self.presence_changed)
    }

    /// Mark every trajectory clean after the renderer regenerated its geometry.
    pub fn clear_dirty(&mut self) {
        for trajectory in &mut self.trajectories {
            trajectory.dirty = false;
        }
    }

    // =========================================================================
    // CONNECTION
    // =========================================================================

    /// Adopt the relay-assigned id and ask the room for its state.
    pub fn on_connected(&mut self, client_id: &str, now: Instant) -> Vec<Frame> {
        info!(%client_id, "session: connected");
        self.publisher.set_origin(client_id, now);
        self.awaiting_trajectory_sync = true;
        vec![
            Frame::bare(events::REQUEST_TRAJECTORY_STATE).with_origin(client_id),
            Frame::bare(events::REQUEST_OBJECTS_STATE).with_origin(client_id),
        ]
    }

    /// Drop every remote peer. Local trajectories and objects are kept.
    pub fn on_transport_lost(&mut self) {
        let destroyed = self.registry.clear(&mut self.scene);
        info!(destroyed, "session: transport lost");
        self.publisher.clear_origin();
        self.awaiting_trajectory_sync = false;
        self.presence_changed = true;
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Apply one inbound frame and return any replies.
    pub fn handle_frame(&mut self, frame: &Frame, now: Instant) -> Vec<Frame> {
        if self.publisher.is_echo(frame) {
            trace!(event = %frame.event, "session: own echo dropped");
            return Vec::new();
        }
        debug!(event = %frame.event, origin = ?frame.origin, "session: inbound");

        match frame.event.as_str() {
            events::CONNECTED => match frame.str_field(events::KEY_CLIENT_ID) {
                Some(client_id) => return self.on_connected(client_id, now),
                None => warn!("session: connected frame without clientId"),
            },
            events::ASSIGN_COLOR => {
                if let Some(color) = frame.str_field(events::KEY_COLOR) {
                    self.color = Some(color.to_owned());
                    self.presence_changed = true;
                }
            }
            events::REQUEST_TRAJECTORY_STATE => {
                if !self.trajectories.is_empty() {
                    return self.reply(trajectories_frame(events::SYNC_TRAJECTORIES, &self.trajectories));
                }
            }
            events::REQUEST_OBJECTS_STATE => {
                return self.reply(objects_frame(events::SYNC_OBJECTS, &self.objects));
            }
            events::SYNC_TRAJECTORIES => {
                if self.awaiting_trajectory_sync {
                    if self.apply_trajectories(frame) {
                        self.awaiting_trajectory_sync = false;
                    }
                } else {
                    debug!(origin = ?frame.origin, "session: unsolicited trajectory sync ignored");
                }
            }
            events::UPDATE_TRAJECTORIES => {
                if self.apply_trajectories(frame) {
                    self.awaiting_trajectory_sync = false;
                }
            }
            events::SYNC_OBJECTS | events::UPDATE_OBJECTS_LENGTH => self.apply_object_structure(frame),
            events::UPDATE_VALUES_CLIENTS_OBJECTS => self.apply_object_values(frame),
            events::CLIENT_LIST => self.apply_roster(frame),
            events::SYNC_CLIENTS_DIV => self.presence_changed = true,
            events::CLIENT_DISCONNECTED => match frame.str_field(events::KEY_CLIENT_ID) {
                Some(client_id) => self.remove_client(client_id),
                None => warn!("session: clientDisconnected without clientId"),
            },
            other => debug!(event = other, "session: unhandled event"),
        }
        Vec::new()
    }

    fn reply(&self, frame: Result<Frame, StateError>) -> Vec<Frame> {
        match (frame, self.publisher.origin()) {
            (Ok(frame), Some(origin)) => vec![frame.with_origin(origin)],
            (Ok(frame), None) => vec![frame],
            (Err(e), _) => {
                warn!(error = %e, "session: failed to serialize reply");
                Vec::new()
            }
        }
    }

    /// Returns whether the snapshot was usable.
    fn apply_trajectories(&mut self, frame: &Frame) -> bool {
        match decode_trajectory_payload(frame) {
            Ok(remote) => {
                let report = reconcile_trajectories(&mut self.trajectories, &remote, &mut self.scene);
                info!(
                    event = %frame.event,
                    removed = report.removed,
                    updated = report.updated,
                    appended = report.appended,
                    "session: trajectories reconciled"
                );
                true
            }
            Err(e) => {
                warn!(event = %frame.event, error = %e, "session: trajectory payload ignored");
                false
            }
        }
    }

    fn apply_object_structure(&mut self, frame: &Frame) {
        let Some((sender, remote)) = sender_and_objects(frame) else {
            return;
        };
        let record = self.registry.upsert(sender, ClientPatch::default());
        let report = reconcile_structure(&mut record.objects, &remote, &self.blender, &mut self.scene);
        debug!(
            client_id = %sender,
            created = report.created,
            destroyed = report.destroyed,
            "session: shadow structure reconciled"
        );
    }

    fn apply_object_values(&mut self, frame: &Frame) {
        let Some((sender, remote)) = sender_and_objects(frame) else {
            return;
        };
        match self.registry.get_mut(sender) {
            Some(record) => {
                reconcile_values(&mut record.objects, &remote, &self.blender);
            }
            None => {
                // The structural frame that should have introduced this peer was lost.
                info!(client_id = %sender, "session: heartbeat from unknown client, seeding shadows");
                let record = self.registry.upsert(sender, ClientPatch::default());
                reconcile_structure(&mut record.objects, &remote, &self.blender, &mut self.scene);
            }
        }
    }

    fn apply_roster(&mut self, frame: &Frame) {
        let Some(entries) = frame.data.as_object() else {
            warn!("session: clientList payload is not an object");
            return;
        };
        let local_id = self.publisher.origin().map(str::to_owned);

        for (client_id, entry) in entries {
            if local_id.as_deref() == Some(client_id.as_str()) {
                continue;
            }
            let known = self.registry.contains(client_id);
            let color = entry.get(events::KEY_COLOR).and_then(Value::as_str).map(str::to_owned);
            let record = self.registry.upsert(client_id, ClientPatch { color });
            if known {
                continue;
            }
            if let Some(objects) = entry.get(events::KEY_OBJECTS) {
                match decode_objects_value(objects) {
                    Ok(remote) => {
                        reconcile_structure(&mut record.objects, &remote, &self.blender, &mut self.scene);
                    }
                    Err(e) => warn!(%client_id, error = %e, "session: roster objects ignored"),
                }
            }
        }

        // Anyone no longer listed left without us hearing about it.
        for client_id in self.registry.client_ids() {
            if !entries.contains_key(&client_id) {
                self.remove_client(&client_id);
            }
        }
        self.presence_changed = true;
    }

    fn remove_client(&mut self, client_id: &str) {
        if self.registry.remove(client_id, &mut self.scene).is_some() {
            self.presence_changed = true;
        }
    }

    // =========================================================================
    // LOCAL EDITS
    // =========================================================================

    /// Append a trajectory and return its index.
    pub fn add_trajectory(&mut self, mut trajectory: Trajectory, now: Instant) -> usize {
        rebuild_points(&mut trajectory, &mut self.scene);
        trajectory.dirty = true;
        self.trajectories.push(trajectory);
        self.trajectories_edited(now);
        self.trajectories.len() - 1
    }

    /// Delete the trajectory at `index`. Later trajectories shift down one
    /// index; objects referring to them are left as they are.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoSuchTrajectory`] if `index` is out of range.
    pub fn remove_trajectory(&mut self, index: usize, now: Instant) -> Result<(), CommandError> {
        if index >= self.trajectories.len() {
            return Err(CommandError::NoSuchTrajectory(index));
        }
        let mut removed = self.trajectories.remove(index);
        release_points(&mut removed, &mut self.scene);
        self.trajectories_edited(now);
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates [`CommandError`] from the edit; nothing is published then.
    pub fn apply_trajectory_command(
        &mut self,
        index: usize,
        command: TrajectoryCommand,
        now: Instant,
    ) -> Result<(), CommandError> {
        if command == TrajectoryCommand::Delete {
            return self.remove_trajectory(index, now);
        }
        let trajectory = self
            .trajectories
            .get_mut(index)
            .ok_or(CommandError::NoSuchTrajectory(index))?;
        edit_trajectory(trajectory, command, &mut self.scene)?;
        self.trajectories_edited(now);
        Ok(())
    }

    /// A local edit supersedes any join reply still in flight.
    fn trajectories_edited(&mut self, now: Instant) {
        self.awaiting_trajectory_sync = false;
        self.publisher.mark(Structural::Trajectories, now);
    }

    /// Add an object following `trajectory_index`, reusing the lowest empty
    /// slot. Returns the slot.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoSuchTrajectory`] if the trajectory does not exist.
    pub fn add_object(&mut self, trajectory_index: usize, now: Instant) -> Result<usize, CommandError> {
        if trajectory_index >= self.trajectories.len() {
            return Err(CommandError::NoSuchTrajectory(trajectory_index));
        }
        let mut object = AnimatedObject::new(trajectory_index);
        object.color = self.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_owned());
        object.handle = Some(self.scene.spawn_marker(&object.color));

        let slot = match self.objects.iter().position(Option::is_none) {
            Some(hole) => {
                self.objects[hole] = Some(object);
                hole
            }
            None => {
                self.objects.push(Some(object));
                self.objects.len() - 1
            }
        };
        self.publisher.mark(Structural::Objects, now);
        Ok(slot)
    }

    /// # Errors
    ///
    /// [`CommandError::NoSuchObject`] for an empty or missing slot, or the
    /// field's own validation error.
    pub fn apply_object_command(&mut self, slot: usize, command: ObjectCommand, now: Instant) -> Result<(), CommandError> {
        let entry = self.objects.get_mut(slot).ok_or(CommandError::NoSuchObject(slot))?;
        match command {
            ObjectCommand::Delete => {
                let object = entry.take().ok_or(CommandError::NoSuchObject(slot))?;
                despawn_shadow(object, &mut self.scene);
                self.publisher.mark(Structural::Objects, now);
            }
            ObjectCommand::Set(field) => {
                let object = entry.as_mut().ok_or(CommandError::NoSuchObject(slot))?;
                let recolor = matches!(field, ObjectField::Color(_));
                field.apply(object, self.trajectories.len())?;
                if recolor {
                    remint_marker(object, &mut self.scene);
                    self.publisher.mark(Structural::Objects, now);
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // TICK
    // =========================================================================

    /// Advance local and shadow objects by `dt_secs`, then return whatever
    /// the publisher has due.
    pub fn tick(&mut self, now: Instant, dt_secs: f64) -> Vec<Frame> {
        let count = self.trajectories.len();
        let mut dangling = advance_all(&mut self.objects, dt_secs, count);
        for shadows in self.registry.shadows_mut() {
            dangling += advance_all(shadows, dt_secs, count);
        }
        if dangling > 0 {
            trace!(dangling, "session: objects skipped on dangling trajectory");
        }
        self.publisher.poll(now, &self.trajectories, &self.objects)
    }
}

/// Sender id and decoded object array of a frame, or `None` after logging why
/// it is unusable.
fn sender_and_objects(frame: &Frame) -> Option<(&str, Vec<Option<ObjectSnapshot>>)> {
    let Some(sender) = frame.origin.as_deref() else {
        warn!(event = %frame.event, "session: object payload without origin");
        return None;
    };
    match decode_object_payload(frame) {
        Ok(remote) => Some((sender, remote)),
        Err(e) => {
            warn!(event = %frame.event, client_id = %sender, error = %e, "session: object payload ignored");
            None
        }
    }
}

/// Accept the state as a JSON string or an inline array, either under
/// `trajectoriesState` or as the whole payload.
fn decode_trajectory_payload(frame: &Frame) -> Result<Vec<TrajectorySnapshot>, StateError> {
    let state = frame.data.get(events::KEY_TRAJECTORIES_STATE).unwrap_or(&frame.data);
    match state {
        Value::String(raw) => decode_trajectories(raw),
        inline @ Value::Array(_) => decode_trajectories_value(inline),
        _ => Err(StateError::MissingState(events::KEY_TRAJECTORIES_STATE)),
    }
}

/// Accept the state as a JSON string or as an inline array.
fn decode_object_payload(frame: &Frame) -> Result<Vec<Option<ObjectSnapshot>>, StateError> {
    match frame.data.get(events::KEY_OBJECTS_STATE) {
        Some(Value::String(raw)) => decode_objects(raw),
        Some(inline @ Value::Array(_)) => decode_objects_value(inline),
        _ => Err(StateError::MissingState(events::KEY_OBJECTS_STATE)),
    }
}
