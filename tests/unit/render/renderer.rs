use super::*;
use crate::foundation::core::ShapeId;
use crate::render::context::{DrawingContextOptions, PartialShapeParams};
use crate::render::transform::Transform;
use crate::shapes::rect::{RectParams, RectShape};
use crate::testing::{Call, RecordingSurface};

fn shape(id: &str, z: i32, opacity: f64, x: f64) -> DrawingContext {
    DrawingContext::from_shape(
        RectShape::new(RectParams {
            x,
            width: 1.0,
            height: 1.0,
            fill_color: Some("red".into()),
            ..Default::default()
        }),
        DrawingContextOptions {
            id: Some(ShapeId::new(id)),
            transforms: vec![Transform::translate(x, 0.0)],
            shape_params: PartialShapeParams {
                z_index: Some(z),
                opacity: Some(opacity),
            },
        },
    )
}

fn painted_x(calls: &[Call]) -> Vec<f64> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::FillRect(x, ..) => Some(*x),
            _ => None,
        })
        .collect()
}

#[test]
fn paints_in_ascending_z_order() {
    let a = shape("a", 2, 1.0, 1.0);
    let b = shape("b", 1, 1.0, 2.0);
    let mut s = RecordingSurface::new();
    render_shapes(&mut s, &[&a, &b]);
    assert_eq!(painted_x(&s.calls()), vec![2.0, 1.0]);
}

#[test]
fn ties_keep_input_order() {
    let shapes: Vec<_> = (0..5).map(|i| shape(&i.to_string(), 0, 1.0, i as f64)).collect();
    let refs: Vec<&DrawingContext> = shapes.iter().rev().collect();
    let mut s = RecordingSurface::new();
    render_shapes(&mut s, &refs);
    assert_eq!(painted_x(&s.calls()), vec![4.0, 3.0, 2.0, 1.0, 0.0]);
}

#[test]
fn each_shape_is_isolated_by_save_restore() {
    let a = shape("a", 0, 0.5, 1.0);
    let b = shape("b", 1, 0.8, 2.0);
    let mut s = RecordingSurface::new();
    render_shapes(&mut s, &[&b, &a]);
    assert_eq!(
        s.calls(),
        vec![
            Call::Save,
            Call::GlobalAlpha(0.5),
            Call::Translate(1.0, 0.0),
            Call::FillStyle("red".into()),
            Call::FillRect(1.0, 0.0, 1.0, 1.0),
            Call::Restore,
            Call::Save,
            Call::GlobalAlpha(0.8),
            Call::Translate(2.0, 0.0),
            Call::FillStyle("red".into()),
            Call::FillRect(2.0, 0.0, 1.0, 1.0),
            Call::Restore,
        ]
    );
    assert_eq!(s.global_alpha(), 1.0);
}

#[test]
fn input_is_left_untouched() {
    let a = shape("a", 5, 1.0, 1.0);
    let b = shape("b", -5, 1.0, 2.0);
    let input = [&a, &b];
    let mut s = RecordingSurface::new();
    render_shapes(&mut s, &input);
    assert_eq!(input[0].id().as_str(), "a");
}
