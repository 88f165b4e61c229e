//! Trajectory reconciliation.
//!
//! DESIGN
//! ======
//! The newest snapshot wins outright; there is no merge. The local collection
//! is first shrunk from the tail to the snapshot length, then every index is
//! overwritten or appended. Control points are replaced wholesale: all point
//! handles of a touched trajectory are released and recreated, which costs
//! handle identity but avoids diffing point lists.
//!
//! Touched trajectories are only marked dirty. Mesh regeneration happens on
//! the renderer's next tick, never from here.

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod reconcile_test;

use crate::codec::TrajectorySnapshot;
use crate::model::Trajectory;
use crate::scene::Scene;

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrajectoryReport {
    pub removed: usize,
    pub updated: usize,
    pub appended: usize,
}

/// Make `local` match `remote`.
///
/// Safe to call back-to-back with arbitrary snapshots: applying the same
/// snapshot twice yields the same observable state as applying it once.
pub fn reconcile_trajectories(
    local: &mut Vec<Trajectory>,
    remote: &[TrajectorySnapshot],
    scene: &mut dyn Scene,
) -> TrajectoryReport {
    let mut report = TrajectoryReport::default();

    // Shrink from the highest index down so lower indices stay valid throughout.
    while local.len() > remote.len() {
        if let Some(mut removed) = local.pop() {
            release_points(&mut removed, scene);
            report.removed += 1;
        }
    }

    for (index, snapshot) in remote.iter().enumerate() {
        if let Some(existing) = local.get_mut(index) {
            snapshot.apply_scalars(existing);
            if let Some(points) = &snapshot.points {
                existing.points.clone_from(points);
            }
            rebuild_points(existing, scene);
            existing.dirty = true;
            report.updated += 1;
        } else {
            let mut created = snapshot.to_trajectory();
            rebuild_points(&mut created, scene);
            created.dirty = true;
            local.push(created);
            report.appended += 1;
        }
    }

    report
}

/// Release every control-point handle held by `trajectory`.
pub fn release_points(trajectory: &mut Trajectory, scene: &mut dyn Scene) {
    for handle in trajectory.point_handles.drain(..) {
        scene.despawn(handle);
    }
}

/// Replace `trajectory`'s point handles with one fresh handle per point.
pub fn rebuild_points(trajectory: &mut Trajectory, scene: &mut dyn Scene) {
    release_points(trajectory, scene);
    trajectory.point_handles = trajectory
        .points
        .iter()
        .map(|point| scene.spawn_point(*point))
        .collect();
}
