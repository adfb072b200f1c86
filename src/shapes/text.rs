use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::foundation::core::Meta;
use crate::host::platform::Host;
use crate::host::surface::{Direction, DrawContext, TextAlign, TextBaseline};
use crate::shapes::base::{ReadyCallback, Shape, ShapeParams, meta_object};

pub const DEFAULT_FONT: &str = "16px sans-serif";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextParams {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub opacity: f64,
    /// CSS font shorthand.
    pub font: String,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
    pub direction: Direction,
    pub max_width: Option<f64>,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub line_width: f64,
    pub z_index: i32,
    #[serde(skip)]
    pub on_ready: Option<ReadyCallback>,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            text: String::new(),
            opacity: 1.0,
            font: DEFAULT_FONT.to_owned(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
            direction: Direction::Inherit,
            max_width: None,
            fill_color: None,
            stroke_color: None,
            line_width: 1.0,
            z_index: 0,
            on_ready: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TextShape {
    params: TextParams,
}

impl TextShape {
    /// Builds the shape and asks the host to get its font ready. `on_ready` fires once that
    /// succeeds; a failed font load is logged and the text keeps drawing with whatever face the
    /// surface falls back to.
    pub fn new(params: TextParams, host: &dyn Host) -> Self {
        let on_ready = params.on_ready.clone();
        let font = params.font.clone();
        host.load_font(
            &params.font,
            Box::new(move |result| match result {
                Ok(()) => {
                    if let Some(cb) = on_ready {
                        cb.call();
                    }
                }
                Err(err) => tracing::warn!(font = %font, error = %err, "font failed to load"),
            }),
        );
        Self { params }
    }
}

impl Shape for TextShape {
    fn draw(&self, ctx: &mut dyn DrawContext) {
        let p = &self.params;
        ctx.set_font(&p.font);
        ctx.set_text_align(p.text_align);
        ctx.set_text_baseline(p.text_baseline);
        ctx.set_direction(p.direction);

        if let Some(fill) = &p.fill_color {
            ctx.set_fill_style(fill);
            ctx.fill_text(&p.text, p.x, p.y, p.max_width);
        }
        if let Some(stroke) = &p.stroke_color
            && p.line_width > 0.0
        {
            ctx.set_stroke_style(stroke);
            ctx.set_line_width(p.line_width);
            ctx.stroke_text(&p.text, p.x, p.y, p.max_width);
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
            "text": p.text,
            "font": p.font,
            "textAlign": p.text_align,
            "textBaseline": p.text_baseline,
        }))
    }
}
