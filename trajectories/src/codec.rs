//! Snapshot serialization for trajectory collections and object arrays.
//!
//! DESIGN
//! ======
//! Encoding is a pure function of current state. Decoding is lenient at the
//! field level: every field of a snapshot entry is optional, and a field that
//! is missing or of the wrong type leaves the receiver's current value in
//! place when the snapshot is applied. Only a payload that is not JSON, or
//! not an array, is rejected as a whole.
//!
//! No other module builds or parses these payload strings by hand.

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;

use serde::Serialize;
use serde_json::Value;

use crate::consts::{DEFAULT_COLOR, DEFAULT_TENSION};
use crate::model::{AnimatedObject, Direction, Point3, Slots, Trajectory, wrap_unit};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("state payload must be a JSON array")]
    NotAnArray,
    #[error("frame payload is missing `{0}`")]
    MissingState(&'static str),
}

/// One trajectory as carried on the wire. Absent fields keep local values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrajectorySnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point3>>,
}

/// One object slot as carried on the wire. Absent fields keep local values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animate: Option<bool>,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub looped: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(rename = "trajectoryIndex", skip_serializing_if = "Option::is_none")]
    pub trajectory_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// =============================================================================
// SERIALIZE
// =============================================================================

/// Snapshot every trajectory in index order.
#[must_use]
pub fn serialize_trajectories(trajectories: &[Trajectory]) -> Vec<TrajectorySnapshot> {
    trajectories.iter().map(TrajectorySnapshot::from).collect()
}

/// Snapshot every object slot, holes included as `None`.
#[must_use]
pub fn serialize_objects(objects: &Slots<AnimatedObject>) -> Vec<Option<ObjectSnapshot>> {
    objects
        .iter()
        .map(|slot| slot.as_ref().map(ObjectSnapshot::from))
        .collect()
}

/// Serialize trajectories into the payload string carried by frames.
///
/// # Errors
///
/// Returns [`StateError::InvalidJson`] if serialization fails.
pub fn encode_trajectories(trajectories: &[Trajectory]) -> Result<String, StateError> {
    Ok(serde_json::to_string(&serialize_trajectories(trajectories))?)
}

/// Serialize an object array into the payload string carried by frames.
///
/// # Errors
///
/// Returns [`StateError::InvalidJson`] if serialization fails.
pub fn encode_objects(objects: &Slots<AnimatedObject>) -> Result<String, StateError> {
    Ok(serde_json::to_string(&serialize_objects(objects))?)
}

impl From<&Trajectory> for TrajectorySnapshot {
    fn from(t: &Trajectory) -> Self {
        Self {
            tension: Some(t.tension),
            closed: Some(t.closed),
            color: Some(t.color.clone()),
            points: Some(t.points.clone()),
        }
    }
}

impl From<&AnimatedObject> for ObjectSnapshot {
    fn from(o: &AnimatedObject) -> Self {
        Self {
            animate: Some(o.animate),
            looped: Some(o.looped),
            speed: Some(o.speed),
            position: Some(o.position),
            trajectory_index: Some(o.trajectory_index),
            direction: Some(o.direction),
            color: Some(o.color.clone()),
        }
    }
}

// =============================================================================
// DESERIALIZE
// =============================================================================

/// Parse a trajectory payload string.
///
/// # Errors
///
/// Returns [`StateError::InvalidJson`] or [`StateError::NotAnArray`] when the
/// payload as a whole is unusable. Malformed entries decode to empty snapshots.
pub fn decode_trajectories(raw: &str) -> Result<Vec<TrajectorySnapshot>, StateError> {
    let value: Value = serde_json::from_str(raw)?;
    decode_trajectories_value(&value)
}

/// Parse an already-decoded trajectory array.
///
/// # Errors
///
/// Returns [`StateError::NotAnArray`] when `value` is not an array.
pub fn decode_trajectories_value(value: &Value) -> Result<Vec<TrajectorySnapshot>, StateError> {
    let rows = value.as_array().ok_or(StateError::NotAnArray)?;
    Ok(rows.iter().map(parse_trajectory).collect())
}

/// Parse an object payload string. `null` and non-object entries are holes.
///
/// # Errors
///
/// Returns [`StateError::InvalidJson`] or [`StateError::NotAnArray`] when the
/// payload as a whole is unusable.
pub fn decode_objects(raw: &str) -> Result<Vec<Option<ObjectSnapshot>>, StateError> {
    let value: Value = serde_json::from_str(raw)?;
    decode_objects_value(&value)
}

/// Parse an already-decoded object array, as found in roster payloads.
///
/// # Errors
///
/// Returns [`StateError::NotAnArray`] when `value` is not an array.
pub fn decode_objects_value(value: &Value) -> Result<Vec<Option<ObjectSnapshot>>, StateError> {
    let rows = value.as_array().ok_or(StateError::NotAnArray)?;
    Ok(rows.iter().map(parse_object).collect())
}

fn parse_trajectory(row: &Value) -> TrajectorySnapshot {
    TrajectorySnapshot {
        tension: row.get("tension").and_then(Value::as_f64),
        closed: row.get("closed").and_then(Value::as_bool),
        color: row.get("color").and_then(Value::as_str).map(str::to_owned),
        points: row
            .get("points")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_point).collect()),
    }
}

fn parse_point(row: &Value) -> Option<Point3> {
    let x = row.get("x").and_then(Value::as_f64)?;
    let y = row.get("y").and_then(Value::as_f64)?;
    let z = row.get("z").and_then(Value::as_f64).unwrap_or(0.0);
    Some(Point3 { x, y, z })
}

fn parse_object(row: &Value) -> Option<ObjectSnapshot> {
    let row = row.as_object()?;
    Some(ObjectSnapshot {
        animate: row.get("animate").and_then(Value::as_bool),
        looped: row.get("loop").and_then(Value::as_bool),
        speed: row
            .get("speed")
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite()),
        position: row
            .get("position")
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite()),
        trajectory_index: row.get("trajectoryIndex").and_then(parse_index),
        direction: row.get("direction").and_then(Direction::from_wire),
        color: row.get("color").and_then(Value::as_str).map(str::to_owned),
    })
}

/// Accept integer or float-encoded non-negative indices.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_index(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return match usize::try_from(n) {
            Ok(index) => Some(index),
            Err(_) => None,
        };
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        Some(f as usize)
    } else {
        None
    }
}

// =============================================================================
// APPLY
// =============================================================================

impl TrajectorySnapshot {
    /// Overwrite the scalar fields present in this snapshot.
    pub fn apply_scalars(&self, target: &mut Trajectory) {
        if let Some(tension) = self.tension {
            target.tension = tension;
        }
        if let Some(closed) = self.closed {
            target.closed = closed;
        }
        if let Some(color) = &self.color {
            target.color.clone_from(color);
        }
    }

    /// Build a fresh trajectory, defaulting every absent field.
    #[must_use]
    pub fn to_trajectory(&self) -> Trajectory {
        Trajectory::new(
            self.points.clone().unwrap_or_default(),
            self.closed.unwrap_or(false),
            self.tension.unwrap_or(DEFAULT_TENSION),
            self.color.as_deref().unwrap_or(DEFAULT_COLOR),
        )
    }
}

impl ObjectSnapshot {
    /// Overwrite the discrete fields present in this snapshot. Color is left
    /// to the lifecycle path, which owns the marker drawn in it.
    pub fn apply_discrete(&self, target: &mut AnimatedObject) {
        if let Some(index) = self.trajectory_index {
            target.trajectory_index = index;
        }
        if let Some(direction) = self.direction {
            target.direction = direction;
        }
        if let Some(looped) = self.looped {
            target.looped = looped;
        }
        if let Some(animate) = self.animate {
            target.animate = animate;
        }
    }

    /// Overwrite every field present in this snapshot without blending.
    pub fn apply_all(&self, target: &mut AnimatedObject) {
        self.apply_discrete(target);
        if let Some(color) = &self.color {
            target.color.clone_from(color);
        }
        if let Some(speed) = self.speed {
            target.speed = speed;
        }
        if let Some(position) = self.position {
            target.position = wrap_unit(position);
        }
    }

    /// Build a fresh object, defaulting every absent field.
    #[must_use]
    pub fn to_object(&self) -> AnimatedObject {
        let mut object = AnimatedObject::new(0);
        self.apply_all(&mut object);
        object
    }
}
