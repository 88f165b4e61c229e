use super::*;
use crate::blend::MotionBlender;
use crate::codec::ObjectSnapshot;
use crate::lifecycle::reconcile_structure;
use crate::scene::HeadlessScene;

fn seed(registry: &mut ClientRegistry, scene: &mut HeadlessScene, client_id: &str, count: usize) {
    let remote = vec![Some(ObjectSnapshot::default()); count];
    let record = registry.upsert(client_id, ClientPatch::default());
    reconcile_structure(&mut record.objects, &remote, &MotionBlender::default(), scene);
}

#[test]
fn upsert_creates_on_first_reference_with_default_color() {
    let mut registry = ClientRegistry::new();
    registry.upsert("a", ClientPatch::default());
    assert!(registry.contains("a"));
    assert_eq!(registry.get("a").map(|r| r.color.as_str()), Some(DEFAULT_COLOR));
}

#[test]
fn upsert_applies_color_and_keeps_objects() {
    let mut registry = ClientRegistry::new();
    let mut scene = HeadlessScene::new();
    seed(&mut registry, &mut scene, "a", 2);

    registry.upsert("a", ClientPatch { color: Some("#123456".to_owned()) });

    let record = registry.get("a").expect("record");
    assert_eq!(record.color, "#123456");
    assert_eq!(record.objects.len(), 2);
}

#[test]
fn upsert_without_color_leaves_color_unchanged() {
    let mut registry = ClientRegistry::new();
    registry.upsert("a", ClientPatch { color: Some("#abcdef".to_owned()) });
    registry.upsert("a", ClientPatch::default());
    assert_eq!(registry.get("a").map(|r| r.color.as_str()), Some("#abcdef"));
}

#[test]
fn remove_retracts_every_shadow_of_that_client() {
    let mut registry = ClientRegistry::new();
    let mut scene = HeadlessScene::new();
    seed(&mut registry, &mut scene, "a", 5);
    seed(&mut registry, &mut scene, "b", 2);

    assert_eq!(registry.remove("a", &mut scene), Some(5));

    assert!(!registry.contains("a"));
    assert_eq!(registry.shadow_count(), 2);
    assert_eq!(scene.live_markers(), 2);
}

#[test]
fn removing_twice_or_unknown_client_is_a_no_op() {
    let mut registry = ClientRegistry::new();
    let mut scene = HeadlessScene::new();
    seed(&mut registry, &mut scene, "a", 1);

    assert_eq!(registry.remove("a", &mut scene), Some(1));
    assert_eq!(registry.remove("a", &mut scene), None);
    assert_eq!(registry.remove("ghost", &mut scene), None);
    assert!(registry.is_empty());
}

#[test]
fn presence_is_sorted_by_client_id() {
    let mut registry = ClientRegistry::new();
    registry.upsert("c", ClientPatch { color: Some("#c".to_owned()) });
    registry.upsert("a", ClientPatch { color: Some("#a".to_owned()) });
    registry.upsert("b", ClientPatch::default());

    let presence = registry.presence();
    let ids: Vec<&str> = presence.iter().map(|p| p.client_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(presence[0].color, "#a");
}

#[test]
fn clear_removes_all_clients_and_shadows() {
    let mut registry = ClientRegistry::new();
    let mut scene = HeadlessScene::new();
    seed(&mut registry, &mut scene, "a", 3);
    seed(&mut registry, &mut scene, "b", 1);

    assert_eq!(registry.clear(&mut scene), 4);
    assert!(registry.is_empty());
    assert_eq!(scene.live_handles(), 0);
}
