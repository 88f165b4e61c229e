//! Document model: trajectories, animated objects and sparse slot arrays.
//!
//! Trajectory identity is positional: the index into the shared ordered
//! collection. Object identity is the slot index into its owning peer's
//! array, where an absent slot is an explicit `None` so later slots keep
//! their addresses after a deletion.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_COLOR, DEFAULT_TENSION, POSITION_MAX};
use crate::scene::HandleId;

/// Sparse, slot-addressed array. `None` marks an absent slot.
pub type Slots<T> = Vec<Option<T>>;

/// One 3D control point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// An editable spline path.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Ordered control points.
    pub points: Vec<Point3>,
    /// Whether the last point wraps to the first.
    pub closed: bool,
    /// Spline shape parameter.
    pub tension: f64,
    /// Display color as a CSS color string.
    pub color: String,
    /// Visual handles, one per control point, owned by the scene.
    pub(crate) point_handles: Vec<HandleId>,
    /// Derived geometry needs regenerating on the next render tick.
    pub dirty: bool,
}

impl Trajectory {
    /// Build a trajectory with no visual handles yet.
    #[must_use]
    pub fn new(points: Vec<Point3>, closed: bool, tension: f64, color: impl Into<String>) -> Self {
        Self { points, closed, tension, color: color.into(), point_handles: Vec::new(), dirty: true }
    }

    /// Visual handles currently held for this trajectory's control points.
    #[must_use]
    pub fn point_handles(&self) -> &[HandleId] {
        &self.point_handles
    }

    /// Observable equality: geometry and styling, ignoring handles and dirt.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.points == other.points
            && self.closed == other.closed
            && self.tension.to_bits() == other.tension.to_bits()
            && self.color == other.color
    }
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new(Vec::new(), false, DEFAULT_TENSION, DEFAULT_COLOR)
    }
}

/// Travel direction along a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    /// `+1.0` forward, `-1.0` reverse.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }

    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    /// Parse the wire form. Accepts the lowercase names and signed numbers.
    #[must_use]
    pub fn from_wire(value: &serde_json::Value) -> Option<Self> {
        if let Some(name) = value.as_str() {
            return match name.trim().to_ascii_lowercase().as_str() {
                "forward" => Some(Self::Forward),
                "reverse" => Some(Self::Reverse),
                _ => None,
            };
        }
        let n = value.as_f64()?;
        if n < 0.0 {
            Some(Self::Reverse)
        } else if n > 0.0 {
            Some(Self::Forward)
        } else {
            None
        }
    }
}

/// A marker animated along one trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedObject {
    /// Index of the followed trajectory. May dangle transiently.
    pub trajectory_index: usize,
    /// Normalized arc-length position in `[0, 1)`.
    pub position: f64,
    /// Fraction of the path travelled per second.
    pub speed: f64,
    pub direction: Direction,
    /// Wrap at the ends when set, bounce otherwise.
    pub looped: bool,
    /// Whether position advances on each tick.
    pub animate: bool,
    pub color: String,
    /// Marker handle owned by the scene.
    pub(crate) handle: Option<HandleId>,
}

impl AnimatedObject {
    /// Build an object following `trajectory_index` with no visual handle yet.
    #[must_use]
    pub fn new(trajectory_index: usize) -> Self {
        Self {
            trajectory_index,
            position: 0.0,
            speed: 0.0,
            direction: Direction::Forward,
            looped: true,
            animate: false,
            color: DEFAULT_COLOR.to_owned(),
            handle: None,
        }
    }

    /// Marker handle currently held for this object.
    #[must_use]
    pub fn handle(&self) -> Option<HandleId> {
        self.handle
    }

    /// Observable equality, ignoring the visual handle.
    #[must_use]
    pub fn same_state(&self, other: &Self) -> bool {
        self.trajectory_index == other.trajectory_index
            && self.position.to_bits() == other.position.to_bits()
            && self.speed.to_bits() == other.speed.to_bits()
            && self.direction == other.direction
            && self.looped == other.looped
            && self.animate == other.animate
            && self.color == other.color
    }
}

/// Map any finite value into `[0, 1)`. Non-finite input maps to `0.0`.
#[must_use]
pub fn wrap_unit(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(1.0);
    // rem_euclid can round tiny negatives up to exactly 1.0.
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Clamp any value into `[0, 1)`. Non-finite input maps to `0.0`.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, POSITION_MAX)
}

/// Number of present entries in a slot array.
#[must_use]
pub fn live_count<T>(slots: &Slots<T>) -> usize {
    slots.iter().filter(|slot| slot.is_some()).count()
}
