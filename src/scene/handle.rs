//! Builder API over one layer: shapes are added through nested group scopes that contribute a
//! transform prefix, multiplicative opacity and additive z-index.

use std::cell::RefCell;
use std::rc::Rc;

use crate::compose::layer::Layer;
use crate::foundation::core::ShapeId;
use crate::foundation::error::{StrataError, StrataResult};
use crate::render::context::{DrawingContext, DrawingContextOptions, PartialShapeParams};
use crate::render::transform::Transform;
use crate::scene::options::{AddShapeOptions, GroupOptions, RemoveOptions};
use crate::shapes::base::{Shape, ShapeParams};
use crate::shapes::circle::{CircleParams, CircleShape};
use crate::shapes::ellipse::{EllipseParams, EllipseShape};
use crate::shapes::image::{ImageParams, ImageShape};
use crate::shapes::line::{LineParams, LineShape};
use crate::shapes::polygon::{PolygonParams, PolygonShape};
use crate::shapes::rect::{RectParams, RectShape};
use crate::shapes::text::{TextParams, TextShape};

#[derive(Default)]
struct ScopeStacks {
    transforms: Vec<Vec<Transform>>,
    groups: Vec<ShapeParams>,
}

/// Adds and removes shapes on a [`Layer`]. Cloning yields another handle sharing the same scope
/// stacks.
#[derive(Clone)]
pub struct LayerHandle {
    layer: Layer,
    stacks: Rc<RefCell<ScopeStacks>>,
}

impl std::fmt::Debug for LayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stacks = self.stacks.borrow();
        f.debug_struct("LayerHandle")
            .field("layer", &self.layer.name())
            .field("depth", &stacks.groups.len())
            .finish()
    }
}

// Pops one transform scope and one group scope when dropped, unwinding included.
struct ScopeGuard<'a> {
    stacks: &'a RefCell<ScopeStacks>,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        let mut stacks = self.stacks.borrow_mut();
        stacks.transforms.pop();
        stacks.groups.pop();
    }
}

impl LayerHandle {
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            stacks: Rc::default(),
        }
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Number of open group scopes.
    pub fn depth(&self) -> usize {
        self.stacks.borrow().groups.len()
    }

    /// Flattened transforms of all open scopes, outermost first.
    pub fn current_transforms(&self) -> Vec<Transform> {
        self.stacks.borrow().transforms.concat()
    }

    /// Opacity product and z-index sum of all open scopes.
    pub fn current_group_params(&self) -> ShapeParams {
        self.stacks
            .borrow()
            .groups
            .iter()
            .fold(ShapeParams::default(), |acc, g| ShapeParams {
                z_index: acc.z_index.saturating_add(g.z_index),
                opacity: acc.opacity * g.opacity,
            })
    }

    fn enter(&self, options: &GroupOptions) -> ScopeGuard<'_> {
        let mut stacks = self.stacks.borrow_mut();
        stacks.transforms.push(options.transforms());
        stacks.groups.push(ShapeParams {
            z_index: options.z_index.unwrap_or(0),
            opacity: options.opacity.unwrap_or(1.0),
        });
        ScopeGuard {
            stacks: &self.stacks,
        }
    }

    fn insert(&self, shape: Box<dyn Shape>, options: AddShapeOptions) -> ShapeId {
        let AddShapeOptions {
            id,
            transforms,
            shape_params,
        } = options;
        let transforms = transforms.unwrap_or_else(|| self.current_transforms());

        let group = self.current_group_params();
        let own = shape.shape_params();
        let resolved = shape_params.resolve(ShapeParams {
            z_index: group.z_index.saturating_add(own.z_index),
            opacity: group.opacity * own.opacity,
        });

        let ctx = DrawingContext::from_boxed(
            shape,
            DrawingContextOptions {
                id,
                transforms,
                shape_params: PartialShapeParams {
                    z_index: Some(resolved.z_index),
                    opacity: Some(resolved.opacity),
                },
            },
        );
        let id = ctx.id().clone();
        self.layer.set_shape(ctx);
        id
    }

    fn delete(&self, id: &ShapeId, options: RemoveOptions) -> StrataResult<()> {
        if self.layer.has_shape(id) {
            self.layer.remove_shape(id);
        } else if options.strict {
            return Err(StrataError::not_found(format!(
                "Shape with id \"{id}\" not found"
            )));
        }
        Ok(())
    }

    fn scoped<E>(
        &self,
        parent: Option<&GroupScope<'_>>,
        options: &GroupOptions,
        body: impl FnOnce(&GroupScope<'_>) -> Result<(), E>,
    ) -> Result<Vec<ShapeId>, E> {
        let scope = GroupScope {
            handle: self,
            parent,
            ids: RefCell::default(),
        };
        {
            let _guard = self.enter(options);
            body(&scope)?;
        }
        Ok(scope.ids.into_inner())
    }
}

/// Handle passed to a group body. Records the id of every shape added through it, including
/// shapes added by nested groups.
pub struct GroupScope<'a> {
    handle: &'a LayerHandle,
    parent: Option<&'a GroupScope<'a>>,
    ids: RefCell<Vec<ShapeId>>,
}

impl GroupScope<'_> {
    /// Ids recorded so far, in insertion order.
    pub fn ids(&self) -> Vec<ShapeId> {
        self.ids.borrow().clone()
    }

    fn record(&self, id: &ShapeId) {
        self.ids.borrow_mut().push(id.clone());
        if let Some(parent) = self.parent {
            parent.record(id);
        }
    }
}

/// Shape-building operations shared by [`LayerHandle`] and [`GroupScope`].
pub trait ShapeSink {
    #[doc(hidden)]
    fn layer_handle(&self) -> &LayerHandle;

    #[doc(hidden)]
    fn scope(&self) -> Option<&GroupScope<'_>>;

    /// Register `shape` and return its id.
    ///
    /// Transforms come from the open group scopes unless `options.transforms` is set, which
    /// replaces them entirely. Opacity and z-index combine the shape's own values with the
    /// groups' (product and sum); explicit values in `options.shape_params` win.
    fn add_boxed(&self, shape: Box<dyn Shape>, options: AddShapeOptions) -> ShapeId {
        let id = self.layer_handle().insert(shape, options);
        if let Some(scope) = self.scope() {
            scope.record(&id);
        }
        id
    }

    fn add(&self, shape: impl Shape + 'static, options: AddShapeOptions) -> ShapeId
    where
        Self: Sized,
    {
        self.add_boxed(Box::new(shape), options)
    }

    /// Unknown ids are ignored unless `options.strict` is set.
    fn remove(&self, id: &ShapeId, options: RemoveOptions) -> StrataResult<()> {
        self.layer_handle().delete(id, options)
    }

    fn rect(&self, params: RectParams) -> ShapeId {
        self.add_boxed(Box::new(RectShape::new(params)), AddShapeOptions::default())
    }

    fn circle(&self, params: CircleParams) -> ShapeId {
        self.add_boxed(Box::new(CircleShape::new(params)), AddShapeOptions::default())
    }

    fn ellipse(&self, params: EllipseParams) -> ShapeId {
        self.add_boxed(Box::new(EllipseShape::new(params)), AddShapeOptions::default())
    }

    fn line(&self, params: LineParams) -> ShapeId {
        self.add_boxed(Box::new(LineShape::new(params)), AddShapeOptions::default())
    }

    fn polygon(&self, params: PolygonParams) -> ShapeId {
        self.add_boxed(Box::new(PolygonShape::new(params)), AddShapeOptions::default())
    }

    fn text(&self, params: TextParams) -> ShapeId {
        let host = self.layer_handle().layer().host();
        self.add_boxed(
            Box::new(TextShape::new(params, host.as_ref())),
            AddShapeOptions::default(),
        )
    }

    fn image(&self, params: ImageParams) -> ShapeId {
        let host = self.layer_handle().layer().host();
        self.add_boxed(
            Box::new(ImageShape::new(params, host.as_ref())),
            AddShapeOptions::default(),
        )
    }

    /// Run `body` inside a new group scope and return the ids it added. The scope is closed on
    /// every exit path.
    fn group(&self, options: GroupOptions, body: impl FnOnce(&GroupScope<'_>)) -> Vec<ShapeId>
    where
        Self: Sized,
    {
        let ids = self
            .layer_handle()
            .scoped(self.scope(), &options, |scope| {
                body(scope);
                Ok::<(), std::convert::Infallible>(())
            });
        match ids {
            Ok(ids) => ids,
            Err(never) => match never {},
        }
    }

    /// [`ShapeSink::group`] for fallible bodies. The first error is returned after the scope has
    /// been closed; shapes added before it stay registered.
    fn try_group<E>(
        &self,
        options: GroupOptions,
        body: impl FnOnce(&GroupScope<'_>) -> Result<(), E>,
    ) -> Result<Vec<ShapeId>, E>
    where
        Self: Sized,
    {
        self.layer_handle().scoped(self.scope(), &options, body)
    }
}

impl ShapeSink for LayerHandle {
    fn layer_handle(&self) -> &LayerHandle {
        self
    }

    fn scope(&self) -> Option<&GroupScope<'_>> {
        None
    }
}

impl ShapeSink for GroupScope<'_> {
    fn layer_handle(&self) -> &LayerHandle {
        self.handle
    }

    fn scope(&self) -> Option<&GroupScope<'_>> {
        Some(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/handle.rs"]
mod tests;
