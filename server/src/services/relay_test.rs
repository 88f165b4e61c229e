use serde_json::json;
use tokio::time::{Duration, timeout};

use super::*;
use crate::services::palette::PALETTE;

async fn recv(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("receive timed out")
        .expect("channel closed")
}

async fn assert_nothing(rx: &mut mpsc::Receiver<Frame>) {
    assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err(), "expected no frame");
}

#[tokio::test]
async fn join_assigns_distinct_palette_colors() {
    let state = RelayState::new(8);
    let (tx_a, _rx_a) = mpsc::channel(8);
    let (tx_b, _rx_b) = mpsc::channel(8);

    let a = join(&state, "a", tx_a).await;
    let b = join(&state, "b", tx_b).await;

    assert!(PALETTE.contains(&a.as_str()));
    assert!(PALETTE.contains(&b.as_str()));
    assert_ne!(a, b);
    assert_eq!(state.clients.read().await.len(), 2);
}

#[tokio::test]
async fn part_is_idempotent() {
    let state = RelayState::new(8);
    let (tx, _rx) = mpsc::channel(8);
    join(&state, "a", tx).await;

    assert!(part(&state, "a").await);
    assert!(!part(&state, "a").await);
    assert!(!part(&state, "ghost").await);
}

#[tokio::test]
async fn broadcast_skips_the_excluded_client() {
    let state = RelayState::new(8);
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    join(&state, "a", tx_a).await;
    join(&state, "b", tx_b).await;

    let frame = Frame::bare(events::UPDATE_TRAJECTORIES).with_origin("a");
    assert_eq!(broadcast(&state, &frame, Some("a")).await, 1);

    assert_eq!(recv(&mut rx_b).await.event, events::UPDATE_TRAJECTORIES);
    assert_nothing(&mut rx_a).await;
}

#[tokio::test]
async fn full_channels_drop_instead_of_blocking() {
    let state = RelayState::new(1);
    let (tx, mut rx) = mpsc::channel(1);
    join(&state, "slow", tx).await;

    let frame = Frame::bare(events::UPDATE_VALUES_CLIENTS_OBJECTS);
    assert_eq!(broadcast(&state, &frame, None).await, 1);
    assert_eq!(broadcast(&state, &frame, None).await, 0);

    recv(&mut rx).await;
    assert_nothing(&mut rx).await;
}

#[tokio::test]
async fn roster_lists_color_and_recorded_objects() {
    let state = RelayState::new(8);
    let (tx, _rx) = mpsc::channel(8);
    let color = join(&state, "a", tx).await;

    let announce = Frame::event(events::UPDATE_OBJECTS_LENGTH, json!({ events::KEY_OBJECTS_STATE: "[null,{\"position\":0.5}]" }));
    assert!(record_objects(&state, "a", &announce).await);

    let frame = roster(&state).await;
    assert_eq!(frame.event, events::CLIENT_LIST);
    assert_eq!(frame.data["a"]["color"], json!(color));
    assert_eq!(frame.data["a"]["objects"], json!([null, { "position": 0.5 }]));
}

#[tokio::test]
async fn only_structural_object_frames_are_recorded() {
    let state = RelayState::new(8);
    let (tx, _rx) = mpsc::channel(8);
    join(&state, "a", tx).await;

    let heartbeat = Frame::event(events::UPDATE_VALUES_CLIENTS_OBJECTS, json!({ events::KEY_OBJECTS_STATE: "[{}]" }));
    let garbage = Frame::event(events::SYNC_OBJECTS, json!({ events::KEY_OBJECTS_STATE: "{not json" }));
    let not_array = Frame::event(events::SYNC_OBJECTS, json!({ events::KEY_OBJECTS_STATE: "{}" }));

    assert!(!record_objects(&state, "a", &heartbeat).await);
    assert!(!record_objects(&state, "a", &garbage).await);
    assert!(!record_objects(&state, "a", &not_array).await);
    assert!(!record_objects(&state, "ghost", &Frame::event(events::SYNC_OBJECTS, json!({ events::KEY_OBJECTS_STATE: "[]" }))).await);

    let frame = roster(&state).await;
    assert_eq!(frame.data["a"]["objects"], json!([]));
}

#[tokio::test]
async fn inline_object_arrays_are_recorded() {
    let state = RelayState::new(8);
    let (tx, _rx) = mpsc::channel(8);
    join(&state, "a", tx).await;

    let frame = Frame::event(events::SYNC_OBJECTS, json!({ events::KEY_OBJECTS_STATE: [{ "speed": 1.0 }] }));
    assert!(record_objects(&state, "a", &frame).await);
    assert_eq!(roster(&state).await.data["a"]["objects"], json!([{ "speed": 1.0 }]));
}

#[tokio::test]
async fn roster_broadcast_reaches_everyone_with_current_membership() {
    let state = RelayState::new(8);
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    join(&state, "a", tx_a).await;
    join(&state, "b", tx_b).await;

    assert_eq!(broadcast_roster(&state).await, 2);

    for rx in [&mut rx_a, &mut rx_b] {
        let frame = recv(rx).await;
        assert_eq!(frame.event, events::CLIENT_LIST);
        assert_eq!(frame.data.as_object().map(Map::len), Some(2));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rosters_never_arrive_older_than_ones_already_seen() {
    let state = RelayState::new(64);
    let (tx, mut rx) = mpsc::channel(64);
    join(&state, "watcher", tx).await;

    let mut tasks = Vec::new();
    for n in 0..8 {
        let state = state.clone();
        tasks.push(tokio::spawn(async move {
            let (tx, _rx) = mpsc::channel(64);
            join(&state, &format!("peer-{n}"), tx).await;
            broadcast_roster(&state).await;
        }));
    }
    for task in tasks {
        task.await.expect("task");
    }

    let mut last = 0;
    let mut seen = 0;
    while let Ok(frame) = rx.try_recv() {
        let size = frame.data.as_object().map_or(0, Map::len);
        assert!(size >= last, "roster of {size} after one of {last}");
        last = size;
        seen += 1;
    }
    assert_eq!(seen, 8);
    assert_eq!(last, 9);
}
