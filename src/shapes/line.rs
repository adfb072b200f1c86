use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::foundation::core::Meta;
use crate::host::surface::DrawContext;
use crate::shapes::base::{Shape, ShapeParams, meta_object};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineParams {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub opacity: f64,
    /// Without a stroke color the line is invisible.
    pub stroke_color: Option<String>,
    pub line_width: f64,
    pub z_index: i32,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
            opacity: 1.0,
            stroke_color: None,
            line_width: 1.0,
            z_index: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineShape {
    params: LineParams,
}

impl LineShape {
    pub fn new(params: LineParams) -> Self {
        Self { params }
    }
}

impl Shape for LineShape {
    fn draw(&self, ctx: &mut dyn DrawContext) {
        let p = &self.params;
        let Some(stroke) = &p.stroke_color else {
            return;
        };
        if p.line_width <= 0.0 {
            return;
        }
        ctx.begin_path();
        ctx.move_to(p.x1, p.y1);
        ctx.line_to(p.x2, p.y2);
        ctx.set_stroke_style(stroke);
        ctx.set_line_width(p.line_width);
        ctx.stroke();
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
            "x1": p.x1,
            "y1": p.y1,
            "x2": p.x2,
            "y2": p.y2,
            "strokeColor": p.stroke_color,
            "lineWidth": p.line_width,
        }))
    }
}
