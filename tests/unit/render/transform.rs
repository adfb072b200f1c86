use super::*;
use crate::testing::{Call, RecordingSurface};

fn applied(ts: &[Transform]) -> Vec<Call> {
    let mut s = RecordingSurface::new();
    apply_transforms(&mut s, ts);
    s.calls()
}

#[test]
fn origin_free_ops_are_direct() {
    assert_eq!(
        applied(&[
            Transform::translate(1.0, 2.0),
            Transform::scale(2.0, -1.0),
            Transform::rotate(0.5),
        ]),
        vec![
            Call::Translate(1.0, 2.0),
            Call::Scale(2.0, -1.0),
            Call::Rotate(0.5),
        ]
    );
}

#[test]
fn pivoted_ops_decompose_around_the_origin() {
    assert_eq!(
        applied(&[
            Transform::scale_about(2.0, 3.0, 10.0, 20.0),
            Transform::rotate_about(1.0, 0.0, 5.0),
        ]),
        vec![
            Call::Translate(10.0, 20.0),
            Call::Scale(2.0, 3.0),
            Call::Translate(-10.0, -20.0),
            Call::Translate(0.0, 5.0),
            Call::Rotate(1.0),
            Call::Translate(-0.0, -5.0),
        ]
    );
}

#[test]
fn empty_list_touches_nothing() {
    assert!(applied(&[]).is_empty());
}

#[test]
fn transforms_use_tagged_json() {
    let ts: Vec<Transform> = serde_json::from_str(
        r#"[
            {"type": "translate", "translateX": 5, "translateY": 6},
            {"type": "scale", "scaleX": 2, "scaleY": 2, "originX": 1},
            {"type": "rotation", "angle": 3.0}
        ]"#,
    )
    .unwrap();
    assert_eq!(
        ts,
        vec![
            Transform::translate(5.0, 6.0),
            Transform::scale_about(2.0, 2.0, 1.0, 0.0),
            Transform::rotate(3.0),
        ]
    );
}
