use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::foundation::core::Meta;
use crate::host::surface::DrawContext;
use crate::shapes::base::{Shape, ShapeParams, meta_object};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RectParams {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub line_width: f64,
    pub z_index: i32,
}

impl Default for RectParams {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            opacity: 1.0,
            fill_color: None,
            stroke_color: None,
            line_width: 1.0,
            z_index: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RectShape {
    params: RectParams,
}

impl RectShape {
    pub fn new(params: RectParams) -> Self {
        Self { params }
    }
}

impl Shape for RectShape {
    fn draw(&self, ctx: &mut dyn DrawContext) {
        let p = &self.params;
        if let Some(fill) = &p.fill_color {
            ctx.set_fill_style(fill);
            ctx.fill_rect(p.x, p.y, p.width, p.height);
        }
        if let Some(stroke) = &p.stroke_color
            && p.line_width > 0.0
        {
            ctx.set_stroke_style(stroke);
            ctx.set_line_width(p.line_width);
            ctx.stroke_rect(p.x, p.y, p.width, p.height);
        }
    }

    fn shape_params(&self) -> ShapeParams {
        ShapeParams {
            z_index: self.params.z_index,
            opacity: self.params.opacity,
        }
    }

    fn meta(&self) -> Meta {
        let p = &self.params;
        meta_object(json!({
            "x": p.x,
            "y": p.y,
            "width": p.width,
            "height": p.height,
            "fillColor": p.fill_color,
            "strokeColor": p.stroke_color,
            "lineWidth": p.line_width,
        }))
    }
}
