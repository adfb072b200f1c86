use super::*;
use crate::render::transform::Transform;
use crate::shapes::rect::{RectParams, RectShape};
use crate::testing::{Call, RecordingSurface};

fn rect(z_index: i32, opacity: f64) -> RectShape {
    RectShape::new(RectParams {
        width: 1.0,
        height: 1.0,
        fill_color: Some("red".into()),
        z_index,
        opacity,
        ..Default::default()
    })
}

#[test]
fn defaults_take_shape_params_and_fresh_id() {
    let a = DrawingContext::from_shape(rect(4, 0.5), DrawingContextOptions::default());
    let b = DrawingContext::from_shape(rect(4, 0.5), DrawingContextOptions::default());
    assert_ne!(a.id(), b.id());
    assert_eq!(
        a.shape_params(),
        ShapeParams {
            z_index: 4,
            opacity: 0.5
        }
    );
    assert!(a.transforms().is_empty());
    assert_eq!(a.meta()["fillColor"], "red");
}

#[test]
fn overrides_apply_field_by_field() {
    let ctx = DrawingContext::from_shape(
        rect(4, 0.5),
        DrawingContextOptions {
            id: Some(ShapeId::new("fixed")),
            shape_params: PartialShapeParams {
                opacity: Some(0.25),
                z_index: None,
            },
            ..Default::default()
        },
    );
    assert_eq!(ctx.id().as_str(), "fixed");
    assert_eq!(
        ctx.shape_params(),
        ShapeParams {
            z_index: 4,
            opacity: 0.25
        }
    );
}

#[test]
fn transform_and_draw_delegate() {
    let ctx = DrawingContext::from_shape(
        rect(0, 1.0),
        DrawingContextOptions {
            transforms: vec![Transform::translate(3.0, 4.0)],
            ..Default::default()
        },
    );
    let mut s = RecordingSurface::new();
    ctx.transform(&mut s);
    ctx.draw(&mut s);
    assert_eq!(
        s.calls(),
        vec![
            Call::Translate(3.0, 4.0),
            Call::FillStyle("red".into()),
            Call::FillRect(0.0, 0.0, 1.0, 1.0),
        ]
    );
}
