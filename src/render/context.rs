use serde::{Deserialize, Serialize};

use crate::foundation::core::{Meta, ShapeId};
use crate::host::surface::DrawContext;
use crate::render::transform::{Transform, apply_transforms};
use crate::shapes::base::{Shape, ShapeParams};

/// Per-field overrides for a shape's own [`ShapeParams`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialShapeParams {
    pub z_index: Option<i32>,
    pub opacity: Option<f64>,
}

impl PartialShapeParams {
    /// Fill unset fields from `base`.
    pub fn resolve(self, base: ShapeParams) -> ShapeParams {
        ShapeParams {
            z_index: self.z_index.unwrap_or(base.z_index),
            opacity: self.opacity.unwrap_or(base.opacity),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DrawingContextOptions {
    /// Defaults to a fresh random id.
    pub id: Option<ShapeId>,
    pub transforms: Vec<Transform>,
    pub shape_params: PartialShapeParams,
}

/// A shape bound to its id, resolved ordering/opacity and transform list; what a layer stores.
pub struct DrawingContext {
    id: ShapeId,
    shape_params: ShapeParams,
    meta: Meta,
    transforms: Vec<Transform>,
    shape: Box<dyn Shape>,
}

impl std::fmt::Debug for DrawingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingContext")
            .field("id", &self.id)
            .field("shape_params", &self.shape_params)
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}

impl DrawingContext {
    pub fn from_shape(shape: impl Shape + 'static, options: DrawingContextOptions) -> Self {
        Self::from_boxed(Box::new(shape), options)
    }

    pub fn from_boxed(shape: Box<dyn Shape>, options: DrawingContextOptions) -> Self {
        let DrawingContextOptions {
            id,
            transforms,
            shape_params,
        } = options;
        Self {
            id: id.unwrap_or_else(ShapeId::random),
            shape_params: shape_params.resolve(shape.shape_params()),
            meta: shape.meta(),
            transforms,
            shape,
        }
    }

    pub fn id(&self) -> &ShapeId {
        &self.id
    }

    pub fn shape_params(&self) -> ShapeParams {
        self.shape_params
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn draw(&self, ctx: &mut dyn DrawContext) {
        self.shape.draw(ctx);
    }

    pub fn transform(&self, ctx: &mut dyn DrawContext) {
        apply_transforms(ctx, &self.transforms);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/context.rs"]
mod tests;
