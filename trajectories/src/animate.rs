//! Local per-tick motion along a trajectory.
//!
//! Positions are normalized arc length, so advancing never needs the
//! tessellated geometry, only whether the referenced trajectory exists.

#[cfg(test)]
#[path = "animate_test.rs"]
mod animate_test;

use crate::consts::POSITION_MAX;
use crate::model::{AnimatedObject, Slots, wrap_unit};

/// Outcome of advancing one object for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved,
    /// `animate` is off.
    Idle,
    /// `trajectory_index` does not resolve. Expected during concurrent edits.
    Dangling,
}

/// Advance `object` by `dt_secs` seconds if it animates along an existing trajectory.
pub fn advance(object: &mut AnimatedObject, dt_secs: f64, trajectory_count: usize) -> Advance {
    if !object.animate {
        return Advance::Idle;
    }
    if object.trajectory_index >= trajectory_count {
        return Advance::Dangling;
    }
    if !dt_secs.is_finite() || !object.speed.is_finite() {
        return Advance::Idle;
    }

    let delta = object.speed * dt_secs * object.direction.sign();
    if object.looped {
        object.position = wrap_unit(object.position + delta);
    } else {
        bounce(object, delta.clamp(-1.0, 1.0));
    }
    Advance::Moved
}

/// Advance every present slot. Returns how many were skipped as dangling.
pub fn advance_all(objects: &mut Slots<AnimatedObject>, dt_secs: f64, trajectory_count: usize) -> usize {
    objects
        .iter_mut()
        .flatten()
        .map(|object| advance(object, dt_secs, trajectory_count))
        .filter(|outcome| *outcome == Advance::Dangling)
        .count()
}

fn bounce(object: &mut AnimatedObject, delta: f64) {
    let mut next = object.position + delta;
    if next >= 1.0 {
        next = 2.0 - next;
        object.direction = object.direction.flipped();
    } else if next < 0.0 {
        next = -next;
        object.direction = object.direction.flipped();
    }
    object.position = if next.is_finite() { next.clamp(0.0, POSITION_MAX) } else { 0.0 };
}
