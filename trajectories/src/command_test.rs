use super::*;
use crate::scene::HeadlessScene;

fn square(scene: &mut HeadlessScene) -> Trajectory {
    let mut trajectory = Trajectory::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        true,
        0.5,
        "#f00",
    );
    rebuild_points(&mut trajectory, scene);
    trajectory.dirty = false;
    trajectory
}

#[test]
fn set_point_moves_only_that_point() {
    let mut scene = HeadlessScene::new();
    let mut trajectory = square(&mut scene);

    edit_trajectory(
        &mut trajectory,
        TrajectoryCommand::SetPoint { index: 2, point: Point3::new(2.0, 2.0, 2.0) },
        &mut scene,
    )
    .expect("set point");

    assert_eq!(trajectory.points[2], Point3::new(2.0, 2.0, 2.0));
    assert_eq!(trajectory.points[1], Point3::new(1.0, 0.0, 0.0));
    assert!(trajectory.dirty);
}

#[test]
fn insert_and_remove_keep_one_handle_per_point() {
    let mut scene = HeadlessScene::new();
    let mut trajectory = square(&mut scene);

    edit_trajectory(
        &mut trajectory,
        TrajectoryCommand::InsertPoint { index: 4, point: Point3::new(-1.0, 0.5, 0.0) },
        &mut scene,
    )
    .expect("append");
    assert_eq!(trajectory.points.len(), 5);
    assert_eq!(trajectory.point_handles().len(), 5);
    assert_eq!(scene.live_points(), 5);

    edit_trajectory(&mut trajectory, TrajectoryCommand::RemovePoint { index: 0 }, &mut scene).expect("remove");
    assert_eq!(trajectory.points[0], Point3::new(1.0, 0.0, 0.0));
    assert_eq!(scene.live_points(), 4);
}

#[test]
fn removal_stops_at_two_points() {
    let mut scene = HeadlessScene::new();
    let mut trajectory = square(&mut scene);

    for _ in 0..2 {
        edit_trajectory(&mut trajectory, TrajectoryCommand::RemovePoint { index: 0 }, &mut scene).expect("remove");
    }
    let err = edit_trajectory(&mut trajectory, TrajectoryCommand::RemovePoint { index: 0 }, &mut scene);

    assert_eq!(err, Err(CommandError::TooFewPoints));
    assert_eq!(trajectory.points.len(), 2);
}

#[test]
fn out_of_range_point_edits_are_rejected() {
    let mut scene = HeadlessScene::new();
    let mut trajectory = square(&mut scene);

    let set = edit_trajectory(
        &mut trajectory,
        TrajectoryCommand::SetPoint { index: 9, point: Point3::default() },
        &mut scene,
    );
    let insert = edit_trajectory(
        &mut trajectory,
        TrajectoryCommand::InsertPoint { index: 5, point: Point3::default() },
        &mut scene,
    );

    assert_eq!(set, Err(CommandError::PointOutOfRange { index: 9, len: 4 }));
    assert_eq!(insert, Err(CommandError::PointOutOfRange { index: 5, len: 4 }));
    assert!(!trajectory.dirty);
}

#[test]
fn scalar_edits_update_fields() {
    let mut scene = HeadlessScene::new();
    let mut trajectory = square(&mut scene);

    edit_trajectory(&mut trajectory, TrajectoryCommand::SetTension(0.8), &mut scene).expect("tension");
    edit_trajectory(&mut trajectory, TrajectoryCommand::SetClosed(false), &mut scene).expect("closed");
    edit_trajectory(&mut trajectory, TrajectoryCommand::SetColor("#0f0".to_owned()), &mut scene).expect("color");

    assert_eq!(trajectory.tension, 0.8);
    assert!(!trajectory.closed);
    assert_eq!(trajectory.color, "#0f0");
    assert_eq!(
        edit_trajectory(&mut trajectory, TrajectoryCommand::SetTension(f64::NAN), &mut scene),
        Err(CommandError::NotFinite("tension"))
    );
}

#[test]
fn object_fields_apply_with_validation() {
    let mut object = AnimatedObject::new(0);

    ObjectField::Position(1.25).apply(&mut object, 2).expect("position");
    ObjectField::Speed(0.4).apply(&mut object, 2).expect("speed");
    ObjectField::Direction(Direction::Reverse).apply(&mut object, 2).expect("direction");
    ObjectField::Loop(false).apply(&mut object, 2).expect("loop");
    ObjectField::Animate(true).apply(&mut object, 2).expect("animate");
    ObjectField::TrajectoryIndex(1).apply(&mut object, 2).expect("index");

    assert!((object.position - 0.25).abs() < 1e-12);
    assert_eq!(object.speed, 0.4);
    assert_eq!(object.direction, Direction::Reverse);
    assert!(!object.looped);
    assert!(object.animate);
    assert_eq!(object.trajectory_index, 1);

    assert_eq!(
        ObjectField::TrajectoryIndex(2).apply(&mut object, 2),
        Err(CommandError::NoSuchTrajectory(2))
    );
    assert_eq!(ObjectField::Speed(f64::INFINITY).apply(&mut object, 2), Err(CommandError::NotFinite("speed")));
    assert_eq!(object.trajectory_index, 1);
}

#[test]
fn only_color_is_structural() {
    assert!(ObjectField::Color("#fff".to_owned()).is_structural());
    assert!(!ObjectField::Position(0.5).is_structural());
    assert!(!ObjectField::Animate(true).is_structural());
}
