//! Scripted authoring for `demo` runs.

#[cfg(test)]
#[path = "demo_test.rs"]
mod demo_test;

use std::f64::consts::TAU;
use std::time::Instant;

use tracing::{info, warn};
use trajectories::command::{CommandError, ObjectCommand, ObjectField};
use trajectories::consts::{DEFAULT_COLOR, DEFAULT_TENSION};
use trajectories::{Point3, Scene, SessionState, Trajectory};

use crate::DemoArgs;

const RING_POINTS: u32 = 6;
const RING_RADIUS: f64 = 2.0;
const RING_SPACING: f64 = 5.0;

/// Append `args.trajectories` closed rings, then spread `args.objects`
/// animating objects across them. Objects fall back to the room's existing
/// trajectories when no new ones are requested.
pub fn author<S: Scene>(session: &mut SessionState<S>, args: DemoArgs, now: Instant) -> Result<(), CommandError> {
    let color = session.color().unwrap_or(DEFAULT_COLOR).to_owned();
    let first = session.trajectories().len();
    for ring in 0..args.trajectories {
        session.add_trajectory(ring_at(first + ring, &color), now);
    }

    let (base, span) = if args.trajectories > 0 {
        (first, args.trajectories)
    } else {
        (0, session.trajectories().len())
    };
    if span == 0 && args.objects > 0 {
        warn!(objects = args.objects, "demo: no trajectories to attach objects to");
        return Ok(());
    }

    for n in 0..args.objects {
        let slot = session.add_object(base + n % span, now)?;
        let position = fraction(n, args.objects);
        for field in [ObjectField::Position(position), ObjectField::Speed(args.speed), ObjectField::Animate(true)] {
            session.apply_object_command(slot, ObjectCommand::Set(field), now)?;
        }
    }

    info!(trajectories = args.trajectories, objects = args.objects, "demo: authored");
    Ok(())
}

/// Closed hexagon centred on `(index * spacing, 0, 0)`.
fn ring_at(index: usize, color: &str) -> Trajectory {
    let cx = f64::from(u32::try_from(index).unwrap_or(u32::MAX)) * RING_SPACING;
    let points = (0..RING_POINTS)
        .map(|k| {
            let angle = TAU * f64::from(k) / f64::from(RING_POINTS);
            Point3::new(cx + RING_RADIUS * angle.cos(), RING_RADIUS * angle.sin(), if k % 2 == 0 { 0.0 } else { 0.5 })
        })
        .collect();
    Trajectory::new(points, true, DEFAULT_TENSION, color)
}

#[allow(clippy::cast_precision_loss)]
fn fraction(n: usize, total: usize) -> f64 {
    n as f64 / total.max(1) as f64
}
