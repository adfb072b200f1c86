use std::cell::Cell;
use std::f64::consts::TAU;
use std::rc::Rc;
use std::sync::Arc;

use super::base::{ReadyCallback, Shape, ShapeParams};
use super::circle::{CircleParams, CircleShape};
use super::ellipse::{EllipseParams, EllipseShape};
use super::image::{ImageParams, ImageShape, ImageStatus};
use super::line::{LineParams, LineShape};
use super::polygon::{PolygonParams, PolygonShape};
use super::rect::{RectParams, RectShape};
use super::text::{TextParams, TextShape};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::StrataError;
use crate::host::surface::{Direction, ImageData, TextAlign, TextBaseline};
use crate::testing::{Call, RecordingHost, RecordingSurface};

fn draw(shape: &dyn Shape) -> Vec<Call> {
    let mut s = RecordingSurface::new();
    shape.draw(&mut s);
    s.calls()
}

#[test]
fn rect_fills_then_strokes() {
    let shape = RectShape::new(RectParams {
        x: 1.0,
        y: 2.0,
        width: 3.0,
        height: 4.0,
        fill_color: Some("red".into()),
        stroke_color: Some("blue".into()),
        line_width: 2.0,
        ..Default::default()
    });
    assert_eq!(
        draw(&shape),
        vec![
            Call::FillStyle("red".into()),
            Call::FillRect(1.0, 2.0, 3.0, 4.0),
            Call::StrokeStyle("blue".into()),
            Call::LineWidth(2.0),
            Call::StrokeRect(1.0, 2.0, 3.0, 4.0),
        ]
    );
    assert_eq!(shape.shape_params(), ShapeParams::default());
}

#[test]
fn rect_skips_stroke_without_width() {
    let shape = RectShape::new(RectParams {
        width: 3.0,
        height: 4.0,
        stroke_color: Some("blue".into()),
        line_width: 0.0,
        ..Default::default()
    });
    assert!(draw(&shape).is_empty());
}

#[test]
fn circle_is_a_full_arc() {
    let shape = CircleShape::new(CircleParams {
        radius: 5.0,
        cx: 10.0,
        cy: 20.0,
        fill_color: Some("green".into()),
        z_index: 3,
        opacity: 0.5,
        ..Default::default()
    });
    assert_eq!(
        draw(&shape),
        vec![
            Call::BeginPath,
            Call::Arc(10.0, 20.0, 5.0, 0.0, TAU, false),
            Call::FillStyle("green".into()),
            Call::Fill,
        ]
    );
    assert_eq!(
        shape.shape_params(),
        ShapeParams {
            z_index: 3,
            opacity: 0.5
        }
    );
    assert_eq!(shape.meta()["radius"], 5.0);
}

#[test]
fn ellipse_fills_white_by_default() {
    let shape = EllipseShape::new(EllipseParams {
        radius_x: 4.0,
        radius_y: 2.0,
        rotation: 0.5,
        ..Default::default()
    });
    assert_eq!(
        draw(&shape),
        vec![
            Call::BeginPath,
            Call::Ellipse(0.0, 0.0, 4.0, 2.0, 0.5, 0.0, TAU, false),
            Call::FillStyle("white".into()),
            Call::Fill,
        ]
    );
}

#[test]
fn line_needs_a_stroke_color() {
    let mut params = LineParams {
        x2: 10.0,
        y2: 10.0,
        ..Default::default()
    };
    assert!(draw(&LineShape::new(params.clone())).is_empty());

    params.stroke_color = Some("black".into());
    assert_eq!(
        draw(&LineShape::new(params)),
        vec![
            Call::BeginPath,
            Call::MoveTo(0.0, 0.0),
            Call::LineTo(10.0, 10.0),
            Call::StrokeStyle("black".into()),
            Call::LineWidth(1.0),
            Call::Stroke,
        ]
    );
}

fn pts(n: usize) -> Vec<Point> {
    (0..n).map(|i| Point::new(i as f64, (i * i) as f64)).collect()
}

#[test]
fn polygon_closes_when_filled() {
    let shape = PolygonShape::new(PolygonParams {
        points: pts(3),
        fill_color: Some("red".into()),
        ..Default::default()
    });
    assert!(shape.is_closed());
    assert_eq!(
        draw(&shape),
        vec![
            Call::BeginPath,
            Call::MoveTo(0.0, 0.0),
            Call::LineTo(1.0, 1.0),
            Call::LineTo(2.0, 4.0),
            Call::ClosePath,
            Call::FillStyle("red".into()),
            Call::Fill,
        ]
    );
}

#[test]
fn open_polygon_never_fills() {
    let shape = PolygonShape::new(PolygonParams {
        points: pts(2),
        closed: Some(false),
        fill_color: Some("red".into()),
        stroke_color: Some("blue".into()),
        ..Default::default()
    });
    let calls = draw(&shape);
    assert!(!calls.contains(&Call::Fill));
    assert!(!calls.contains(&Call::ClosePath));
    assert!(calls.contains(&Call::Stroke));
}

#[test]
fn polygon_with_too_few_points_draws_nothing() {
    let closed = PolygonShape::new(PolygonParams {
        points: pts(2),
        fill_color: Some("red".into()),
        ..Default::default()
    });
    assert!(draw(&closed).is_empty());
    let open = PolygonShape::new(PolygonParams {
        points: pts(1),
        stroke_color: Some("red".into()),
        ..Default::default()
    });
    assert!(draw(&open).is_empty());
}

#[test]
fn text_sets_font_state_before_painting() {
    let host = RecordingHost::new();
    let shape = TextShape::new(
        TextParams {
            x: 5.0,
            y: 6.0,
            text: "hi".into(),
            fill_color: Some("black".into()),
            stroke_color: Some("white".into()),
            max_width: Some(40.0),
            ..Default::default()
        },
        &host,
    );
    assert_eq!(
        draw(&shape),
        vec![
            Call::Font("16px sans-serif".into()),
            Call::TextAlign(TextAlign::Start),
            Call::TextBaseline(TextBaseline::Alphabetic),
            Call::Direction(Direction::Inherit),
            Call::FillStyle("black".into()),
            Call::FillText("hi".into(), 5.0, 6.0, Some(40.0)),
            Call::StrokeStyle("white".into()),
            Call::LineWidth(1.0),
            Call::StrokeText("hi".into(), 5.0, 6.0, Some(40.0)),
        ]
    );
    let meta = shape.meta();
    assert_eq!(meta["text"], "hi");
    assert_eq!(meta["textAlign"], "start");
}

#[test]
fn text_ready_fires_only_after_font_loads() {
    let host = RecordingHost::new();
    let ready = Rc::new(Cell::new(0));
    let r = Rc::clone(&ready);
    let _ok = TextShape::new(
        TextParams {
            text: "a".into(),
            font: "bold 20px serif".into(),
            on_ready: Some(ReadyCallback::new(move || r.set(r.get() + 1))),
            ..Default::default()
        },
        &host,
    );
    let r = Rc::clone(&ready);
    let _failed = TextShape::new(
        TextParams {
            text: "b".into(),
            on_ready: Some(ReadyCallback::new(move || r.set(r.get() + 10))),
            ..Default::default()
        },
        &host,
    );
    assert_eq!(host.fonts.borrow()[0].0, "bold 20px serif");
    assert_eq!(ready.get(), 0);
    host.resolve_font(1, Err(StrataError::resource("missing")));
    host.resolve_font(0, Ok(()));
    assert_eq!(ready.get(), 1);
}

fn image_2x3() -> ImageData {
    ImageData {
        width: 2,
        height: 3,
        rgba8_premul: Arc::new(vec![255; 24]),
    }
}

#[test]
fn image_draws_nothing_until_loaded() {
    let host = RecordingHost::new();
    let ready = Rc::new(Cell::new(false));
    let r = Rc::clone(&ready);
    let shape = ImageShape::new(
        ImageParams {
            src: "a.png".into(),
            x: 1.0,
            y: 1.0,
            on_ready: Some(ReadyCallback::new(move || r.set(true))),
            ..Default::default()
        },
        &host,
    );
    assert_eq!(shape.status(), ImageStatus::Loading);
    assert!(draw(&shape).is_empty());

    host.resolve_image(0, Ok(image_2x3()));
    assert!(ready.get());
    assert_eq!(shape.status(), ImageStatus::Loaded);
    assert_eq!(
        draw(&shape),
        vec![Call::DrawImage {
            source_size: (2, 3),
            src: Rect::new(0.0, 0.0, 2.0, 3.0),
            dst: Rect::new(1.0, 1.0, 3.0, 4.0),
        }]
    );
}

#[test]
fn image_explicit_size_wins_but_zero_means_natural() {
    let host = RecordingHost::new();
    let shape = ImageShape::new(
        ImageParams {
            src: "a.png".into(),
            width: Some(10.0),
            height: Some(0.0),
            ..Default::default()
        },
        &host,
    );
    host.resolve_image(0, Ok(image_2x3()));
    let calls = draw(&shape);
    let Call::DrawImage { dst, .. } = &calls[0] else {
        panic!("expected draw_image, got {calls:?}");
    };
    assert_eq!(*dst, Rect::new(0.0, 0.0, 10.0, 3.0));
}

#[test]
fn failed_image_stays_empty() {
    let host = RecordingHost::new();
    let ready = Rc::new(Cell::new(false));
    let r = Rc::clone(&ready);
    let shape = ImageShape::new(
        ImageParams {
            src: "broken.png".into(),
            on_ready: Some(ReadyCallback::new(move || r.set(true))),
            ..Default::default()
        },
        &host,
    );
    host.resolve_image(0, Err(StrataError::resource("decode failed")));
    assert_eq!(shape.status(), ImageStatus::Error);
    assert!(!ready.get());
    assert!(draw(&shape).is_empty());
    assert_eq!(shape.meta()["src"], "broken.png");
}

#[test]
fn params_deserialize_from_camel_case_with_defaults() {
    let rect: RectParams =
        serde_json::from_str(r#"{"width": 10, "height": 5, "fillColor": "red", "zIndex": 2}"#)
            .unwrap();
    assert_eq!(rect.line_width, 1.0);
    assert_eq!(rect.opacity, 1.0);
    assert_eq!(rect.z_index, 2);
    assert_eq!(rect.fill_color.as_deref(), Some("red"));

    let text: TextParams =
        serde_json::from_str(r#"{"text": "x", "textAlign": "center"}"#).unwrap();
    assert_eq!(text.font, "16px sans-serif");
    assert_eq!(text.text_align, TextAlign::Center);

    let poly: PolygonParams =
        serde_json::from_str(r#"{"points": [{"x": 0, "y": 0}, {"x": 1, "y": 2}]}"#).unwrap();
    assert_eq!(poly.points[1], Point::new(1.0, 2.0));
}
