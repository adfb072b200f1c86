use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Meta;
use crate::host::surface::DrawContext;

/// Ordering and opacity a shape is painted with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeParams {
    pub z_index: i32,
    pub opacity: f64,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            z_index: 0,
            opacity: 1.0,
        }
    }
}

/// Anything that can be registered on a layer.
///
/// `draw` paints in the shape's own coordinates; the caller owns save/restore, global alpha and
/// transforms around it.
pub trait Shape {
    fn draw(&self, ctx: &mut dyn DrawContext);
    fn shape_params(&self) -> ShapeParams;
    fn meta(&self) -> Meta;
}

/// Callback fired once an asynchronously loaded resource (image, font) is usable.
#[derive(Clone)]
pub struct ReadyCallback(Rc<dyn Fn()>);

impl ReadyCallback {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl std::fmt::Debug for ReadyCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ReadyCallback")
    }
}

pub(crate) fn meta_object(value: serde_json::Value) -> Meta {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Meta::new(),
    }
}

// Fill then stroke the current path, the way every outline shape finishes.
pub(crate) fn fill_and_stroke(
    ctx: &mut dyn DrawContext,
    fill_color: Option<&str>,
    stroke_color: Option<&str>,
    line_width: f64,
) {
    if let Some(fill) = fill_color {
        ctx.set_fill_style(fill);
        ctx.fill();
    }
    if let Some(stroke) = stroke_color
        && line_width > 0.0
    {
        ctx.set_stroke_style(stroke);
        ctx.set_line_width(line_width);
        ctx.stroke();
    }
}
