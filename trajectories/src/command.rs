//! Tagged local edit commands.
//!
//! Every local edit is one explicit variant, dispatched by `match`, so an
//! unrecognized edit cannot be passed in and silently dropped.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use crate::consts::MIN_TRAJECTORY_POINTS;
use crate::model::{AnimatedObject, Direction, Point3, Trajectory, wrap_unit};
use crate::reconcile::rebuild_points;
use crate::scene::Scene;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    #[error("no trajectory at index {0}")]
    NoSuchTrajectory(usize),
    #[error("no object in slot {0}")]
    NoSuchObject(usize),
    #[error("point index {index} out of range for {len} points")]
    PointOutOfRange { index: usize, len: usize },
    #[error("a trajectory keeps at least {MIN_TRAJECTORY_POINTS} points")]
    TooFewPoints,
    #[error("{0} must be finite")]
    NotFinite(&'static str),
}

/// One settable object field.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectField {
    TrajectoryIndex(usize),
    Position(f64),
    Speed(f64),
    Direction(Direction),
    Loop(bool),
    Animate(bool),
    Color(String),
}

impl ObjectField {
    /// Color changes go out as a structural snapshot; the rest ride the heartbeat.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Color(_))
    }

    /// Write this field into `object`.
    ///
    /// # Errors
    ///
    /// Rejects references to trajectories that do not exist locally and
    /// non-finite numbers.
    pub fn apply(self, object: &mut AnimatedObject, trajectory_count: usize) -> Result<(), CommandError> {
        match self {
            Self::TrajectoryIndex(index) => {
                if index >= trajectory_count {
                    return Err(CommandError::NoSuchTrajectory(index));
                }
                object.trajectory_index = index;
            }
            Self::Position(position) => {
                if !position.is_finite() {
                    return Err(CommandError::NotFinite("position"));
                }
                object.position = wrap_unit(position);
            }
            Self::Speed(speed) => {
                if !speed.is_finite() {
                    return Err(CommandError::NotFinite("speed"));
                }
                object.speed = speed;
            }
            Self::Direction(direction) => object.direction = direction,
            Self::Loop(looped) => object.looped = looped,
            Self::Animate(animate) => object.animate = animate,
            Self::Color(color) => object.color = color,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectCommand {
    Set(ObjectField),
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrajectoryCommand {
    /// Move one existing control point.
    SetPoint { index: usize, point: Point3 },
    /// Insert a control point before `index` (`index == len` appends).
    InsertPoint { index: usize, point: Point3 },
    RemovePoint { index: usize },
    SetTension(f64),
    SetClosed(bool),
    SetColor(String),
    Delete,
}

/// Apply every variant except [`TrajectoryCommand::Delete`], which needs the
/// whole collection and is handled by the session.
///
/// # Errors
///
/// Out-of-range point indices, removal below the minimum point count, and
/// non-finite tension are rejected without touching `trajectory`.
pub fn edit_trajectory(
    trajectory: &mut Trajectory,
    command: TrajectoryCommand,
    scene: &mut dyn Scene,
) -> Result<(), CommandError> {
    let len = trajectory.points.len();
    match command {
        TrajectoryCommand::SetPoint { index, point } => {
            let slot = trajectory
                .points
                .get_mut(index)
                .ok_or(CommandError::PointOutOfRange { index, len })?;
            *slot = point;
        }
        TrajectoryCommand::InsertPoint { index, point } => {
            if index > len {
                return Err(CommandError::PointOutOfRange { index, len });
            }
            trajectory.points.insert(index, point);
            rebuild_points(trajectory, scene);
        }
        TrajectoryCommand::RemovePoint { index } => {
            if index >= len {
                return Err(CommandError::PointOutOfRange { index, len });
            }
            if len <= MIN_TRAJECTORY_POINTS {
                return Err(CommandError::TooFewPoints);
            }
            trajectory.points.remove(index);
            rebuild_points(trajectory, scene);
        }
        TrajectoryCommand::SetTension(tension) => {
            if !tension.is_finite() {
                return Err(CommandError::NotFinite("tension"));
            }
            trajectory.tension = tension;
        }
        TrajectoryCommand::SetClosed(closed) => trajectory.closed = closed,
        TrajectoryCommand::SetColor(color) => trajectory.color = color,
        // Handled by the owner of the collection.
        TrajectoryCommand::Delete => return Ok(()),
    }
    trajectory.dirty = true;
    Ok(())
}
