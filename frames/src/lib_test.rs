use super::*;

fn sample_frame() -> Frame {
    Frame {
        id: "id-1".to_owned(),
        ts: 42,
        origin: Some("client-a".to_owned()),
        event: events::UPDATE_OBJECTS_LENGTH.to_owned(),
        data: serde_json::json!({
            "objectsState": "[null,{\"position\":0.25}]",
            "ok": true,
            "tags": ["a", "b"],
            "nested": {"k": "v"},
            "nil": null
        }),
    }
}

#[test]
fn encode_decode_preserves_frame() {
    let frame = sample_frame();
    let bytes = encode_frame(&frame);
    let decoded = decode_frame(&bytes).expect("decode should succeed");
    assert_eq!(decoded, frame);
}

#[test]
fn decode_frame_rejects_malformed_bytes() {
    let err = decode_frame(&[0xff, 0x00, 0x01]).expect_err("bytes should fail");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn decode_frame_defaults_missing_data_to_empty_object() {
    let wire = WireFrame {
        id: "id-1".to_owned(),
        ts: 1,
        origin: None,
        event: events::REQUEST_OBJECTS_STATE.to_owned(),
        data: None,
    };
    let mut bytes = Vec::new();
    wire.encode(&mut bytes).expect("encode");

    let frame = decode_frame(&bytes).expect("decode");
    assert_eq!(frame.data, serde_json::json!({}));
    assert_eq!(frame.origin, None);
}

#[test]
fn decode_frame_converts_nan_number_to_json_null() {
    let wire = WireFrame {
        id: "id-1".to_owned(),
        ts: 1,
        origin: None,
        event: events::CLIENT_LIST.to_owned(),
        data: Some(prost_types::Value { kind: Some(prost_types::value::Kind::NumberValue(f64::NAN)) }),
    };
    let mut bytes = Vec::new();
    wire.encode(&mut bytes).expect("encode");

    let frame = decode_frame(&bytes).expect("decode");
    assert_eq!(frame.data, Value::Null);
}

#[test]
fn integer_json_numbers_are_normalized_to_float_numbers() {
    let frame = Frame::event(events::CLIENT_LIST, serde_json::json!({"count": 2}));
    let decoded = decode_frame(&encode_frame(&frame)).expect("decode");
    assert_eq!(decoded.data.get("count"), Some(&serde_json::json!(2.0)));
}

#[test]
fn event_constructor_stamps_id_and_timestamp() {
    let a = Frame::bare(events::REQUEST_TRAJECTORY_STATE);
    let b = Frame::bare(events::REQUEST_TRAJECTORY_STATE);
    assert_ne!(a.id, b.id);
    assert!(a.ts > 0);
    assert_eq!(a.data, serde_json::json!({}));
    assert!(a.origin.is_none());
}

#[test]
fn is_from_matches_only_stamped_origin() {
    let frame = Frame::bare(events::SYNC_CLIENTS_DIV);
    assert!(!frame.is_from("client-a"));

    let frame = frame.with_origin("client-a");
    assert!(frame.is_from("client-a"));
    assert!(!frame.is_from("client-b"));
}

#[test]
fn json_text_without_origin_or_data_deserializes() {
    let frame: Frame =
        serde_json::from_str(r#"{"id":"x","ts":5,"event":"requestObjectsState"}"#).expect("json frame");
    assert_eq!(frame.origin, None);
    assert_eq!(frame.data, serde_json::json!({}));
    assert_eq!(frame.event, events::REQUEST_OBJECTS_STATE);
}

#[test]
fn str_field_reads_string_payload_values() {
    let frame = Frame::event(events::ASSIGN_COLOR, serde_json::json!({"color": "#ff0000", "n": 1}));
    assert_eq!(frame.str_field(events::KEY_COLOR), Some("#ff0000"));
    assert_eq!(frame.str_field("n"), None);
    assert_eq!(frame.str_field("missing"), None);
}

#[test]
fn structural_object_events_are_recognized() {
    assert!(events::is_object_structural(events::SYNC_OBJECTS));
    assert!(events::is_object_structural(events::UPDATE_OBJECTS_LENGTH));
    assert!(!events::is_object_structural(events::UPDATE_VALUES_CLIENTS_OBJECTS));
    assert!(!events::is_object_structural(events::UPDATE_TRAJECTORIES));
}
