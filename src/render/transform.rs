//! Transform operations applied to a drawing context, in order.

use serde::{Deserialize, Serialize};

use crate::host::surface::DrawContext;

/// One transform step. Scale and rotation take an optional pivot; a non-zero pivot is applied as
/// translate(pivot), op, translate(-pivot).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Transform {
    #[serde(rename = "translate")]
    Translate {
        #[serde(rename = "translateX")]
        x: f64,
        #[serde(rename = "translateY")]
        y: f64,
    },
    #[serde(rename = "scale")]
    Scale {
        #[serde(rename = "scaleX")]
        x: f64,
        #[serde(rename = "scaleY")]
        y: f64,
        #[serde(default, rename = "originX")]
        origin_x: f64,
        #[serde(default, rename = "originY")]
        origin_y: f64,
    },
    #[serde(rename = "rotation")]
    Rotate {
        /// Radians.
        angle: f64,
        #[serde(default, rename = "originX")]
        origin_x: f64,
        #[serde(default, rename = "originY")]
        origin_y: f64,
    },
}

impl Transform {
    pub fn translate(x: f64, y: f64) -> Self {
        Self::Translate { x, y }
    }

    pub fn scale(x: f64, y: f64) -> Self {
        Self::scale_about(x, y, 0.0, 0.0)
    }

    pub fn scale_about(x: f64, y: f64, origin_x: f64, origin_y: f64) -> Self {
        Self::Scale {
            x,
            y,
            origin_x,
            origin_y,
        }
    }

    pub fn rotate(angle: f64) -> Self {
        Self::rotate_about(angle, 0.0, 0.0)
    }

    pub fn rotate_about(angle: f64, origin_x: f64, origin_y: f64) -> Self {
        Self::Rotate {
            angle,
            origin_x,
            origin_y,
        }
    }

    pub fn apply(&self, ctx: &mut dyn DrawContext) {
        match *self {
            Self::Translate { x, y } => ctx.translate(x, y),
            Self::Scale {
                x,
                y,
                origin_x,
                origin_y,
            } => {
                let pivot = origin_x != 0.0 || origin_y != 0.0;
                if pivot {
                    ctx.translate(origin_x, origin_y);
                }
                ctx.scale(x, y);
                if pivot {
                    ctx.translate(-origin_x, -origin_y);
                }
            }
            Self::Rotate {
                angle,
                origin_x,
                origin_y,
            } => {
                let pivot = origin_x != 0.0 || origin_y != 0.0;
                if pivot {
                    ctx.translate(origin_x, origin_y);
                }
                ctx.rotate(angle);
                if pivot {
                    ctx.translate(-origin_x, -origin_y);
                }
            }
        }
    }
}

/// Apply `transforms` left to right. Values are used as given, zero and negative scales included.
pub fn apply_transforms(ctx: &mut dyn DrawContext, transforms: &[Transform]) {
    for t in transforms {
        t.apply(ctx);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/transform.rs"]
mod tests;
