//! Shadow-object lifecycle for one remote peer.
//!
//! DESIGN
//! ======
//! A remote peer's object array is mirrored slot by slot. Two entry points
//! with deliberately disjoint powers:
//!
//! - [`reconcile_structure`] handles join syncs and count changes. It creates
//!   shadows for slots that appeared, destroys shadows whose slot went `null`
//!   or disappeared, and blends slots present on both sides.
//! - [`reconcile_values`] handles heartbeats. It only blends; it never creates
//!   or destroys, so a heartbeat overtaking a structural frame cannot undo it.
//!
//! [`retract_all`] is the disconnect path and the only removal not driven by an
//! explicit `null` slot.
//!
//! Color changes ride on structural frames only. The marker is minted in the
//! object's color, so a recolor swaps the marker through [`remint_marker`].

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;

use crate::blend::MotionBlender;
use crate::codec::ObjectSnapshot;
use crate::model::{AnimatedObject, Slots};
use crate::scene::Scene;

/// What a lifecycle pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleReport {
    pub created: usize,
    pub destroyed: usize,
    pub blended: usize,
}

/// Create, destroy and blend shadows so `shadows` has the shape of `remote`.
pub fn reconcile_structure(
    shadows: &mut Slots<AnimatedObject>,
    remote: &[Option<ObjectSnapshot>],
    blender: &MotionBlender,
    scene: &mut dyn Scene,
) -> LifecycleReport {
    let mut report = LifecycleReport::default();

    if shadows.len() < remote.len() {
        shadows.resize_with(remote.len(), || None);
    }

    for (slot, incoming) in shadows.iter_mut().zip(remote) {
        match (slot.as_mut(), incoming) {
            (None, Some(snapshot)) => {
                *slot = Some(spawn_shadow(snapshot, scene));
                report.created += 1;
            }
            (Some(_), None) => {
                if let Some(existing) = slot.take() {
                    despawn_shadow(existing, scene);
                }
                report.destroyed += 1;
            }
            (Some(existing), Some(snapshot)) => {
                blender.blend(existing, snapshot);
                if let Some(color) = &snapshot.color
                    && *color != existing.color
                {
                    existing.color.clone_from(color);
                    remint_marker(existing, scene);
                }
                report.blended += 1;
            }
            (None, None) => {}
        }
    }

    // Slots past the remote length have disappeared.
    for existing in shadows.drain(remote.len()..).flatten() {
        despawn_shadow(existing, scene);
        report.destroyed += 1;
    }

    report
}

/// Blend slots present on both sides. Never creates or destroys.
pub fn reconcile_values(
    shadows: &mut Slots<AnimatedObject>,
    remote: &[Option<ObjectSnapshot>],
    blender: &MotionBlender,
) -> LifecycleReport {
    let mut report = LifecycleReport::default();
    for (slot, incoming) in shadows.iter_mut().zip(remote) {
        if let (Some(existing), Some(snapshot)) = (slot.as_mut(), incoming) {
            blender.blend(existing, snapshot);
            report.blended += 1;
        }
    }
    report
}

/// Destroy every shadow and leave `shadows` empty. Returns how many were live.
pub fn retract_all(shadows: &mut Slots<AnimatedObject>, scene: &mut dyn Scene) -> usize {
    let mut destroyed = 0;
    for existing in shadows.drain(..).flatten() {
        despawn_shadow(existing, scene);
        destroyed += 1;
    }
    destroyed
}

/// Build an object from a snapshot and give it a fresh marker.
pub fn spawn_shadow(snapshot: &ObjectSnapshot, scene: &mut dyn Scene) -> AnimatedObject {
    let mut object = snapshot.to_object();
    object.handle = Some(scene.spawn_marker(&object.color));
    object
}

/// Replace an object's marker with one drawn in its current color.
pub fn remint_marker(object: &mut AnimatedObject, scene: &mut dyn Scene) {
    if let Some(old) = object.handle.take() {
        scene.despawn(old);
    }
    object.handle = Some(scene.spawn_marker(&object.color));
}

/// Release an object's marker.
pub fn despawn_shadow(object: AnimatedObject, scene: &mut dyn Scene) {
    if let Some(handle) = object.handle {
        scene.despawn(handle);
    }
}
