use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::foundation::core::Meta;
use crate::host::surface::DrawContext;
use crate::shapes::base::{Shape, ShapeParams, fill_and_stroke, meta_object};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircleParams {
    pub radius: f64,
    pub cx: f64,
    pub cy: f64,
    pub opacity: f64,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub line_width: f64,
    pub z_index: i32,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            radius: 0.0,
            cx: 0.0,
            cy: 0.0,
            opacity: 1.0,
            fill_color: None,
            stroke_color: None,
            line_width: 1.0,
            z_index: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CircleShape {
    params: CircleParams,
}

impl CircleShape {
    pub fn new(params: CircleParams) -> Self {
        Self { params }
    }
}

impl Shape for CircleShape {
    fn draw(&self, ctx: &mut dyn DrawContext) {
        let p = &self.params;
        ctx.begin_path();
        ctx.arc(p.cx, p.cy, p.radius, 0.0, TAU, false);
        fill_and_stroke(
            ctx,
            p.fill_color.as_deref(),
            p.stroke_color.as_deref(),
            p.line_width,
        );
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
            "radius": p.radius,
            "cx": p.cx,
            "cy": p.cy,
            "fillColor": p.fill_color,
            "strokeColor": p.stroke_color,
            "lineWidth": p.line_width,
        }))
    }
}
