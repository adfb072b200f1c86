use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::foundation::core::{Meta, Point};
use crate::host::surface::DrawContext;
use crate::shapes::base::{Shape, ShapeParams, meta_object};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolygonParams {
    pub points: Vec<Point>,
    /// Close the outline. When unset, a polygon is closed exactly when it has a fill color.
    pub closed: Option<bool>,
    pub opacity: f64,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub line_width: f64,
    pub z_index: i32,
}

impl Default for PolygonParams {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            closed: None,
            opacity: 1.0,
            fill_color: None,
            stroke_color: None,
            line_width: 1.0,
            z_index: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PolygonShape {
    params: PolygonParams,
}

impl PolygonShape {
    pub fn new(params: PolygonParams) -> Self {
        Self { params }
    }

    pub fn is_closed(&self) -> bool {
        self.params
            .closed
            .unwrap_or(self.params.fill_color.is_some())
    }
}

impl Shape for PolygonShape {
    fn draw(&self, ctx: &mut dyn DrawContext) {
        let p = &self.params;
        let closed = self.is_closed();
        let min_points = if closed { 3 } else { 2 };
        let Some((first, rest)) = p.points.split_first() else {
            return;
        };
        if p.points.len() < min_points {
            return;
        }

        ctx.begin_path();
        ctx.move_to(first.x, first.y);
        for pt in rest {
            ctx.line_to(pt.x, pt.y);
        }
        if closed {
            ctx.close_path();
        }

        if let Some(fill) = &p.fill_color
            && closed
        {
            ctx.set_fill_style(fill);
            ctx.fill();
        }
        if let Some(stroke) = &p.stroke_color
            && p.line_width > 0.0
        {
            ctx.set_stroke_style(stroke);
            ctx.set_line_width(p.line_width);
            ctx.stroke();
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
        let points: Vec<_> = p
            .points
            .iter()
            .map(|pt| json!({ "x": pt.x, "y": pt.y }))
            .collect();
        meta_object(json!({
            "points": points,
            "closed": p.closed,
            "fillColor": p.fill_color,
            "strokeColor": p.stroke_color,
            "lineWidth": p.line_width,
        }))
    }
}
