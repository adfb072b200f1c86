use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::foundation::core::Meta;
use crate::host::surface::DrawContext;
use crate::shapes::base::{Shape, ShapeParams, fill_and_stroke, meta_object};

/// Ellipse parameters. Unlike the other outline shapes, an ellipse is filled white unless told
/// otherwise; set `fill_color: None` explicitly for an outline only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EllipseParams {
    pub cx: f64,
    pub cy: f64,
    pub radius_x: f64,
    pub radius_y: f64,
    pub opacity: f64,
    pub rotation: f64,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub line_width: f64,
    pub z_index: i32,
}

impl Default for EllipseParams {
    fn default() -> Self {
        Self {
            cx: 0.0,
            cy: 0.0,
            radius_x: 0.0,
            radius_y: 0.0,
            opacity: 1.0,
            rotation: 0.0,
            fill_color: Some("white".to_owned()),
            stroke_color: None,
            line_width: 1.0,
            z_index: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EllipseShape {
    params: EllipseParams,
}

impl EllipseShape {
    pub fn new(params: EllipseParams) -> Self {
        Self { params }
    }
}

impl Shape for EllipseShape {
    fn draw(&self, ctx: &mut dyn DrawContext) {
        let p = &self.params;
        ctx.begin_path();
        ctx.ellipse(p.cx, p.cy, p.radius_x, p.radius_y, p.rotation, 0.0, TAU, false);
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
            "radiusX": p.radius_x,
            "radiusY": p.radius_y,
            "cx": p.cx,
            "cy": p.cy,
            "rotation": p.rotation,
            "fillColor": p.fill_color,
            "strokeColor": p.stroke_color,
            "lineWidth": p.line_width,
        }))
    }
}
