use super::*;

#[test]
fn wrap_unit_keeps_values_in_half_open_range() {
    assert_eq!(wrap_unit(0.25), 0.25);
    assert_eq!(wrap_unit(1.0), 0.0);
    assert!((wrap_unit(1.25) - 0.25).abs() < 1e-12);
    assert!((wrap_unit(-0.25) - 0.75).abs() < 1e-12);
    let tiny = wrap_unit(-1e-18);
    assert!((0.0..1.0).contains(&tiny));
}

#[test]
fn wrap_and_clamp_map_non_finite_to_zero() {
    assert_eq!(wrap_unit(f64::NAN), 0.0);
    assert_eq!(wrap_unit(f64::INFINITY), 0.0);
    assert_eq!(clamp_unit(f64::NAN), 0.0);
    assert_eq!(clamp_unit(f64::NEG_INFINITY), 0.0);
}

#[test]
fn clamp_unit_stays_below_one() {
    assert!(clamp_unit(1.0) < 1.0);
    assert!(clamp_unit(7.0) < 1.0);
    assert_eq!(clamp_unit(-3.0), 0.0);
    assert_eq!(clamp_unit(0.5), 0.5);
}

#[test]
fn direction_parses_names_and_signed_numbers() {
    assert_eq!(Direction::from_wire(&serde_json::json!("forward")), Some(Direction::Forward));
    assert_eq!(Direction::from_wire(&serde_json::json!("Reverse")), Some(Direction::Reverse));
    assert_eq!(Direction::from_wire(&serde_json::json!(-1)), Some(Direction::Reverse));
    assert_eq!(Direction::from_wire(&serde_json::json!(1.0)), Some(Direction::Forward));
    assert_eq!(Direction::from_wire(&serde_json::json!(0)), None);
    assert_eq!(Direction::from_wire(&serde_json::json!("sideways")), None);
    assert_eq!(Direction::from_wire(&serde_json::json!(true)), None);
}

#[test]
fn direction_sign_and_flip() {
    assert_eq!(Direction::Forward.sign(), 1.0);
    assert_eq!(Direction::Reverse.sign(), -1.0);
    assert_eq!(Direction::Forward.flipped(), Direction::Reverse);
    assert_eq!(Direction::Reverse.flipped().flipped(), Direction::Reverse);
}

#[test]
fn live_count_skips_absent_slots() {
    let slots: Slots<AnimatedObject> = vec![Some(AnimatedObject::new(0)), None, Some(AnimatedObject::new(1)), None];
    assert_eq!(live_count(&slots), 2);
}

#[test]
fn same_shape_ignores_handles_and_dirty_flag() {
    let a = Trajectory::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)], false, 0.5, "#fff");
    let mut b = a.clone();
    b.dirty = false;
    b.point_handles.push(uuid::Uuid::new_v4());
    assert!(a.same_shape(&b));
    b.tension = 0.6;
    assert!(!a.same_shape(&b));
}

#[test]
fn new_trajectory_starts_dirty_without_handles() {
    let t = Trajectory::default();
    assert!(t.dirty);
    assert!(t.point_handles().is_empty());
    assert!(t.points.is_empty());
}
