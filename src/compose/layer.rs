use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::compose::export::{
    Blob, LayerExportOptions, blit, encode_blob, encode_data_url, export_surface, full_rect,
    target_size,
};
use crate::foundation::core::{Affine, ShapeId};
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::ordered::OrderedMap;
use crate::host::platform::Host;
use crate::host::surface::{DrawContext, Surface};
use crate::render::context::DrawingContext;
use crate::render::renderer::{RenderShapes, render_shapes};

/// What a custom [`LayerRenderer`] gets to paint: the layer opacity and its shapes in insertion
/// order.
pub struct LayerData<'a> {
    pub opacity: f64,
    pub shapes: Vec<&'a DrawingContext>,
}

/// Replaces the default clear-and-paint pass. Receives the default painter so it can delegate.
pub type LayerRenderer = Box<dyn FnMut(&mut dyn DrawContext, LayerData<'_>, RenderShapes)>;

pub struct LayerParams {
    pub name: String,
    pub surface: Box<dyn Surface>,
    /// Applied when compositing, not while painting shapes.
    pub opacity: f64,
    pub renderer: Option<LayerRenderer>,
    /// Fired after every shape mutation or resize.
    pub on_dirty: Option<Box<dyn Fn()>>,
}

impl LayerParams {
    pub fn new(name: impl Into<String>, surface: Box<dyn Surface>) -> Self {
        Self {
            name: name.into(),
            surface,
            opacity: 1.0,
            renderer: None,
            on_dirty: None,
        }
    }
}

struct LayerInner {
    name: String,
    opacity: f64,
    host: Rc<dyn Host>,
    surface: RefCell<Box<dyn Surface>>,
    shapes: RefCell<OrderedMap<ShapeId, DrawingContext>>,
    dirty: Cell<bool>,
    renderer: RefCell<Option<LayerRenderer>>,
    on_dirty: Option<Box<dyn Fn()>>,
}

/// One drawing surface plus the shapes painted on it. Cloning yields another handle to the same
/// layer.
///
/// Mutations only mark the layer dirty; pixels change on the next [`Layer::render`].
#[derive(Clone)]
pub struct Layer {
    inner: Rc<LayerInner>,
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.inner.name)
            .field("opacity", &self.inner.opacity)
            .field("shapes", &self.inner.shapes.borrow().len())
            .field("dirty", &self.inner.dirty.get())
            .finish_non_exhaustive()
    }
}

impl Layer {
    /// Fails when `params.surface` has no 2D context.
    pub fn new(host: Rc<dyn Host>, params: LayerParams) -> StrataResult<Self> {
        let LayerParams {
            name,
            mut surface,
            opacity,
            renderer,
            on_dirty,
        } = params;
        if surface.context_2d().is_none() {
            return Err(StrataError::construction(
                "failed to register layer: canvas context not found",
            ));
        }
        Ok(Self {
            inner: Rc::new(LayerInner {
                name,
                opacity,
                host,
                surface: RefCell::new(surface),
                shapes: RefCell::new(OrderedMap::new()),
                dirty: Cell::new(false),
                renderer: RefCell::new(renderer),
                on_dirty,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn opacity(&self) -> f64 {
        self.inner.opacity
    }

    pub fn host(&self) -> &Rc<dyn Host> {
        &self.inner.host
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// Backing store size in device pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        self.inner.surface.borrow().pixel_size()
    }

    /// Logical size last passed to [`Layer::set_size`].
    pub fn display_size(&self) -> (f64, f64) {
        self.inner.surface.borrow().display_size()
    }

    pub fn shape_ids(&self) -> Vec<ShapeId> {
        self.inner.shapes.borrow().keys().cloned().collect()
    }

    pub fn has_shape(&self, id: &ShapeId) -> bool {
        self.inner.shapes.borrow().contains_key(id)
    }

    /// Run `f` on the shape registered under `id`.
    pub fn with_shape<R>(
        &self,
        id: &ShapeId,
        f: impl FnOnce(&DrawingContext) -> R,
    ) -> Option<R> {
        self.inner.shapes.borrow().get(id).map(f)
    }

    pub fn shape_count(&self) -> usize {
        self.inner.shapes.borrow().len()
    }

    pub fn mark_dirty(&self) {
        self.inner.dirty.set(true);
        if let Some(on_dirty) = &self.inner.on_dirty {
            on_dirty();
        }
    }

    /// Resize to `width x height` logical units. The backing store becomes
    /// `floor(size * scale)` device pixels with `scale = max(device_pixel_ratio, 1)`; existing
    /// pixels are dropped.
    pub fn set_size(&self, width: f64, height: f64) {
        let scale = self.inner.host.device_pixel_ratio().max(1.0);
        {
            let mut surface = self.inner.surface.borrow_mut();
            surface.set_pixel_size((width * scale) as u32, (height * scale) as u32);
            surface.set_display_size(width, height);
            if let Some(ctx) = surface.context_2d() {
                ctx.set_transform(Affine::IDENTITY);
                ctx.scale(scale, scale);
            }
        }
        self.mark_dirty();
    }

    /// Insert or replace by id. A replaced shape keeps its paint-order slot.
    pub fn set_shape(&self, shape: DrawingContext) {
        self.inner.shapes.borrow_mut().insert(shape.id().clone(), shape);
        self.mark_dirty();
    }

    /// Remove by id. Marks the layer dirty even when the id was unknown.
    pub fn remove_shape(&self, id: &ShapeId) -> Option<DrawingContext> {
        let removed = self.inner.shapes.borrow_mut().remove(id);
        self.mark_dirty();
        removed
    }

    /// Repaint if dirty.
    pub fn render(&self) {
        if !self.inner.dirty.get() {
            return;
        }
        let Ok(mut surface) = self.inner.surface.try_borrow_mut() else {
            tracing::warn!(layer = %self.inner.name, "surface busy, render skipped");
            return;
        };
        let (width, height) = surface.pixel_size();
        let Some(ctx) = surface.context_2d() else {
            tracing::warn!(layer = %self.inner.name, "surface lost its 2D context, render skipped");
            return;
        };

        let shapes = self.inner.shapes.borrow();
        let ordered: Vec<&DrawingContext> = shapes.values().collect();
        tracing::debug!(layer = %self.inner.name, shapes = ordered.len(), "render layer");

        match self.inner.renderer.borrow_mut().as_mut() {
            Some(renderer) => renderer(
                ctx,
                LayerData {
                    opacity: self.inner.opacity,
                    shapes: ordered,
                },
                render_shapes as RenderShapes,
            ),
            None => {
                ctx.clear_rect(0.0, 0.0, f64::from(width), f64::from(height));
                render_shapes(ctx, &ordered);
            }
        }
        self.inner.dirty.set(false);
    }

    /// Run `f` with the backing surface borrowed.
    pub(crate) fn with_surface<R>(&self, f: impl FnOnce(&mut dyn Surface) -> R) -> R {
        let mut surface = self.inner.surface.borrow_mut();
        f(&mut **surface)
    }

    #[tracing::instrument(skip(self, options), fields(layer = %self.inner.name))]
    pub fn to_data_url(&self, options: &LayerExportOptions) -> StrataResult<String> {
        self.render();
        self.with_export_surface(options, |surface| {
            Ok(encode_data_url(surface, &options.base))
        })
    }

    #[tracing::instrument(skip(self, options), fields(layer = %self.inner.name))]
    pub async fn to_blob(&self, options: &LayerExportOptions) -> StrataResult<Blob> {
        self.render();
        self.with_export_surface(options, |surface| {
            encode_blob(surface, &options.base, "layer")
        })
    }

    // Hands `f` either the layer's own surface, when exporting it unchanged, or a fresh
    // surface with background, opacity and scaling applied.
    fn with_export_surface<R>(
        &self,
        options: &LayerExportOptions,
        f: impl FnOnce(&mut dyn Surface) -> StrataResult<R>,
    ) -> StrataResult<R> {
        let source = self.pixel_size();
        let target = target_size(source, options.base.max_size);
        let alpha = if options.apply_opacity {
            self.inner.opacity
        } else {
            1.0
        };

        let unchanged = options.base.background.is_none() && alpha == 1.0 && target == source;
        if unchanged {
            return self.with_surface(f);
        }

        let mut export = export_surface(
            self.inner.host.as_ref(),
            target,
            &options.base,
            "failed to export layer: canvas context not found",
        )?;
        {
            let ctx = export.context_2d().ok_or_else(|| {
                StrataError::construction("failed to export layer: canvas context not found")
            })?;
            self.with_surface(|surface| {
                blit(ctx, surface, alpha, full_rect(source), full_rect(target))
            });
        }
        f(export.as_mut())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layer.rs"]
mod tests;
