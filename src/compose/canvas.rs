use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::compose::export::{
    Blob, ExportOptions, LayerExportOptions, blit, encode_blob, encode_data_url, export_surface,
    full_rect, target_size,
};
use crate::compose::layer::Layer;
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::ordered::OrderedMap;
use crate::host::platform::{FrameHandle, Host};
use crate::host::surface::Surface;

struct CanvasInner {
    host: Rc<dyn Host>,
    layers: RefCell<OrderedMap<String, Layer>>,
    frame: Cell<Option<FrameHandle>>,
    scheduled: Cell<bool>,
}

/// Named layers plus the frame scheduler that repaints them and the compositor that flattens
/// them into one image. Cloning yields another handle to the same canvas.
///
/// Scheduling is a two-state machine: idle until [`Canvas::request_render`] asks the host for a
/// frame, scheduled until that frame fires or [`Canvas::cancel_render`] drops it. At most one
/// frame is in flight.
#[derive(Clone)]
pub struct Canvas {
    inner: Rc<CanvasInner>,
}

/// Non-owning handle, for callbacks stored inside the canvas' own layers.
#[derive(Clone, Default)]
pub struct WeakCanvas(Weak<CanvasInner>);

impl WeakCanvas {
    pub fn upgrade(&self) -> Option<Canvas> {
        self.0.upgrade().map(|inner| Canvas { inner })
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("layers", &self.inner.layers.borrow().keys().collect::<Vec<_>>())
            .field("scheduled", &self.inner.scheduled.get())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for WeakCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WeakCanvas")
    }
}

impl Canvas {
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self {
            inner: Rc::new(CanvasInner {
                host,
                layers: RefCell::new(OrderedMap::new()),
                frame: Cell::new(None),
                scheduled: Cell::new(false),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakCanvas {
        WeakCanvas(Rc::downgrade(&self.inner))
    }

    pub fn host(&self) -> &Rc<dyn Host> {
        &self.inner.host
    }

    /// Register `layer` under its name. Returns the layer it replaced, whose surface is left to
    /// the caller.
    pub fn set_layer(&self, layer: Layer) -> Option<Layer> {
        let name = layer.name().to_owned();
        self.inner.layers.borrow_mut().insert(name, layer)
    }

    pub fn get_layer(&self, name: &str) -> Option<Layer> {
        self.inner.layers.borrow().get(name).cloned()
    }

    pub fn delete_layer(&self, name: &str) -> Option<Layer> {
        self.inner.layers.borrow_mut().remove(name)
    }

    /// Layers in registration order.
    pub fn layers(&self) -> Vec<Layer> {
        self.inner.layers.borrow().values().cloned().collect()
    }

    pub fn is_render_scheduled(&self) -> bool {
        self.inner.scheduled.get()
    }

    /// Render every dirty layer now and return to idle.
    pub fn render(&self) {
        self.inner.scheduled.set(false);
        self.inner.frame.set(None);
        for layer in self.layers() {
            layer.render();
        }
    }

    /// Schedule a render on the next frame. Calls while a frame is pending are coalesced.
    pub fn request_render(&self) {
        if self.inner.scheduled.get() {
            return;
        }
        self.inner.scheduled.set(true);

        let canvas = self.downgrade();
        let handle = self.inner.host.request_frame(Box::new(move || {
            if let Some(canvas) = canvas.upgrade() {
                canvas.render();
            }
        }));
        tracing::debug!(frame = handle.0, "render scheduled");
        self.inner.frame.set(Some(handle));
    }

    /// Drop the pending frame, if any.
    pub fn cancel_render(&self) {
        if let Some(handle) = self.inner.frame.take() {
            tracing::debug!(frame = handle.0, "render cancelled");
            self.inner.host.cancel_frame(handle);
        }
        self.inner.scheduled.set(false);
    }

    #[tracing::instrument(skip(self, options))]
    pub fn to_data_url(&self, options: &ExportOptions) -> StrataResult<String> {
        let mut composite = self.composite(options)?;
        Ok(encode_data_url(composite.as_mut(), options))
    }

    #[tracing::instrument(skip(self, options))]
    pub async fn to_blob(&self, options: &ExportOptions) -> StrataResult<Blob> {
        let mut composite = self.composite(options)?;
        encode_blob(composite.as_mut(), options, "canvas")
    }

    pub fn layer_to_data_url(
        &self,
        name: &str,
        options: &LayerExportOptions,
    ) -> StrataResult<String> {
        self.require_layer(name)?.to_data_url(options)
    }

    pub async fn layer_to_blob(
        &self,
        name: &str,
        options: &LayerExportOptions,
    ) -> StrataResult<Blob> {
        self.require_layer(name)?.to_blob(options).await
    }

    fn require_layer(&self, name: &str) -> StrataResult<Layer> {
        self.get_layer(name).ok_or_else(|| {
            StrataError::not_found(format!("failed to export layer: layer \"{name}\" not found"))
        })
    }

    /// Flatten all layers into a fresh surface.
    ///
    /// Every layer is stretched from the same source rectangle, the largest backing size among
    /// layers, onto the whole target. A layer smaller than the largest one therefore scales up.
    fn composite(&self, options: &ExportOptions) -> StrataResult<Box<dyn Surface>> {
        if self.inner.layers.borrow().is_empty() {
            return Err(StrataError::export(
                "failed to export canvas: no layers registered",
            ));
        }
        self.render();

        let layers = self.layers();
        let source = layers
            .iter()
            .map(Layer::pixel_size)
            .fold((0, 0), |acc, (w, h)| (acc.0.max(w), acc.1.max(h)));
        let target = target_size(source, options.max_size);
        tracing::debug!(?source, ?target, layers = layers.len(), "composite");

        let mut export = export_surface(
            self.inner.host.as_ref(),
            target,
            options,
            "failed to export canvas: canvas context not found",
        )?;
        {
            let ctx = export.context_2d().ok_or_else(|| {
                StrataError::construction("failed to export canvas: canvas context not found")
            })?;
            let (src, dst) = (full_rect(source), full_rect(target));
            for layer in &layers {
                let opacity = layer.opacity();
                layer.with_surface(|surface| blit(&mut *ctx, surface, opacity, src, dst));
            }
        }
        Ok(export)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/canvas.rs"]
mod tests;
