use super::*;
use crate::model::Direction;

fn moving(position: f64, speed: f64, looped: bool) -> AnimatedObject {
    let mut object = AnimatedObject::new(0);
    object.position = position;
    object.speed = speed;
    object.looped = looped;
    object.animate = true;
    object
}

#[test]
fn idle_objects_do_not_move() {
    let mut object = moving(0.3, 0.5, true);
    object.animate = false;
    assert_eq!(advance(&mut object, 0.1, 1), Advance::Idle);
    assert_eq!(object.position, 0.3);
}

#[test]
fn dangling_reference_is_skipped_without_moving() {
    let mut object = moving(0.3, 0.5, true);
    object.trajectory_index = 3;
    assert_eq!(advance(&mut object, 0.1, 3), Advance::Dangling);
    assert_eq!(object.position, 0.3);
}

#[test]
fn looped_objects_wrap_forward_and_backward() {
    let mut object = moving(0.9, 1.0, true);
    advance(&mut object, 0.25, 1);
    assert!((object.position - 0.15).abs() < 1e-12);

    object.direction = Direction::Reverse;
    advance(&mut object, 0.25, 1);
    assert!((object.position - 0.9).abs() < 1e-12);
}

#[test]
fn bouncing_objects_reflect_and_flip_direction() {
    let mut object = moving(0.9, 1.0, false);
    advance(&mut object, 0.25, 1);
    assert!((object.position - 0.85).abs() < 1e-12);
    assert_eq!(object.direction, Direction::Reverse);

    let mut object = moving(0.1, 1.0, false);
    object.direction = Direction::Reverse;
    advance(&mut object, 0.25, 1);
    assert!((object.position - 0.15).abs() < 1e-12);
    assert_eq!(object.direction, Direction::Forward);
}

#[test]
fn positions_stay_in_unit_range_over_many_ticks() {
    for looped in [true, false] {
        for speed in [0.0, 0.37, 1.0, 4.9, -2.3] {
            let mut object = moving(0.5, speed, looped);
            for _ in 0..500 {
                advance(&mut object, 1.0 / 60.0, 1);
                assert!((0.0..1.0).contains(&object.position), "looped={looped} speed={speed}");
            }
            advance(&mut object, 10.0, 1);
            assert!((0.0..1.0).contains(&object.position));
        }
    }
}

#[test]
fn advance_all_counts_dangling_slots() {
    let mut dangling = moving(0.5, 1.0, true);
    dangling.trajectory_index = 7;
    let mut objects = vec![Some(moving(0.0, 1.0, true)), None, Some(dangling)];

    assert_eq!(advance_all(&mut objects, 0.5, 2), 1);
    assert_eq!(objects[0].as_ref().map(|o| o.position), Some(0.5));
    assert_eq!(objects[2].as_ref().map(|o| o.position), Some(0.5));
}

#[test]
fn non_finite_inputs_leave_position_untouched() {
    let mut object = moving(0.25, f64::NAN, true);
    assert_eq!(advance(&mut object, 0.1, 1), Advance::Idle);
    assert_eq!(object.position, 0.25);

    let mut object = moving(0.25, 1.0, false);
    assert_eq!(advance(&mut object, f64::INFINITY, 1), Advance::Idle);
    assert_eq!(object.position, 0.25);
}
