use serde::{Deserialize, Serialize};

use crate::foundation::core::ShapeId;
use crate::foundation::error::{StrataError, StrataResult};
use crate::render::context::PartialShapeParams;
use crate::render::transform::Transform;

pub const DEFAULT_LAYER: &str = "default";
pub const DEFAULT_BACKGROUND: &str = "transparent";

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_owned()
}

fn default_layers() -> Vec<String> {
    vec![DEFAULT_LAYER.to_owned()]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneOptions {
    /// Logical width; must be finite and positive.
    pub width: f64,
    pub height: f64,
    /// CSS color of the container behind all layers.
    #[serde(default = "default_background")]
    pub background: String,
    /// Layer names, back to front.
    #[serde(default = "default_layers")]
    pub layers: Vec<String>,
}

impl SceneOptions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: default_background(),
            layers: default_layers(),
        }
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    pub fn with_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers = layers.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn validate(&self) -> StrataResult<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(StrataError::construction(
                "Scene requires width and height in options",
            ))
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateParams {
    pub translate_x: f64,
    pub translate_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleParams {
    pub scale_x: f64,
    pub scale_y: f64,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationParams {
    /// Radians.
    pub angle: f64,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
}

impl From<TranslateParams> for Transform {
    fn from(p: TranslateParams) -> Self {
        Transform::translate(p.translate_x, p.translate_y)
    }
}

impl From<ScaleParams> for Transform {
    fn from(p: ScaleParams) -> Self {
        Transform::scale_about(p.scale_x, p.scale_y, p.origin_x, p.origin_y)
    }
}

impl From<RotationParams> for Transform {
    fn from(p: RotationParams) -> Self {
        Transform::rotate_about(p.angle, p.origin_x, p.origin_y)
    }
}

/// Scope opened by a group: a transform prefix plus opacity and z-index contributions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupOptions {
    pub translate: Option<TranslateParams>,
    pub scale: Option<ScaleParams>,
    pub rotate: Option<RotationParams>,
    /// Multiplies into every shape added inside. Defaults to 1.
    pub opacity: Option<f64>,
    /// Adds to every shape added inside. Defaults to 0.
    pub z_index: Option<i32>,
}

impl GroupOptions {
    /// Transforms this group contributes, in translate, scale, rotate order.
    pub fn transforms(&self) -> Vec<Transform> {
        let mut out = Vec::new();
        out.extend(self.translate.map(Transform::from));
        out.extend(self.scale.map(Transform::from));
        out.extend(self.rotate.map(Transform::from));
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddShapeOptions {
    pub id: Option<ShapeId>,
    /// Replaces the transforms of every enclosing group when set.
    pub transforms: Option<Vec<Transform>>,
    /// Wins over the group-derived value, field by field.
    pub shape_params: PartialShapeParams,
}

impl AddShapeOptions {
    pub fn with_id(id: impl Into<ShapeId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveOptions {
    /// Fail on unknown ids instead of ignoring them.
    pub strict: bool,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/options.rs"]
mod tests;
