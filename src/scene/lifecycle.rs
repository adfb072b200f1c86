use std::rc::Rc;

use crate::compose::canvas::Canvas;
use crate::compose::export::{Blob, ExportOptions};
use crate::compose::layer::{Layer, LayerParams};
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::ordered::OrderedMap;
use crate::host::platform::{Container, Host};
use crate::scene::handle::LayerHandle;
use crate::scene::options::SceneOptions;

/// A sized stack of named layers mounted in a host container.
///
/// Every shape mutation schedules one coalesced repaint on the host's next frame. After
/// [`Scene::destroy`] the scene is inert: resizing and rendering do nothing and exports fail.
pub struct Scene {
    container: Box<dyn Container>,
    canvas: Canvas,
    handles: OrderedMap<String, LayerHandle>,
    layer_names: Vec<String>,
    size: (f64, f64),
    background: String,
    destroyed: bool,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("size", &self.size)
            .field("background", &self.background)
            .field("layers", &self.layer_names)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Size `container`, then create, size and attach one layer surface per name in
    /// `options.layers`, back to front. A repeated name reuses the first layer.
    pub fn new(
        mut container: Box<dyn Container>,
        host: Rc<dyn Host>,
        options: SceneOptions,
    ) -> StrataResult<Self> {
        options.validate()?;
        let SceneOptions {
            width,
            height,
            background,
            layers,
        } = options;

        container.set_size(width, height);
        container.set_background(&background);

        let canvas = Canvas::new(Rc::clone(&host));
        let mut handles: OrderedMap<String, LayerHandle> = OrderedMap::new();
        let mut layer_names = Vec::with_capacity(layers.len());
        for name in layers {
            if handles.contains_key(name.as_str()) {
                tracing::debug!(layer = %name, "duplicate layer name ignored");
                continue;
            }

            let weak = canvas.downgrade();
            let layer = Layer::new(
                Rc::clone(&host),
                LayerParams {
                    on_dirty: Some(Box::new(move || {
                        if let Some(canvas) = weak.upgrade() {
                            canvas.request_render();
                        }
                    })),
                    ..LayerParams::new(name.clone(), host.create_surface())
                },
            )?;
            container.attach_surface(&name, layer_names.len());
            layer.set_size(width, height);
            canvas.set_layer(layer.clone());
            handles.insert(name.clone(), LayerHandle::new(layer));
            layer_names.push(name);
        }
        tracing::debug!(width, height, layers = layer_names.len(), "scene created");

        Ok(Self {
            container,
            canvas,
            handles,
            layer_names,
            size: (width, height),
            background,
            destroyed: false,
        })
    }

    /// Builder handle for the layer called `name`. `None` once destroyed.
    pub fn layer(&self, name: &str) -> Option<&LayerHandle> {
        self.handles.get(name)
    }

    /// Layer names, back to front.
    pub fn layer_names(&self) -> &[String] {
        &self.layer_names
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Resize the container and every layer. Layers lose their pixels and repaint on the next
    /// frame.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if self.destroyed {
            return;
        }
        self.size = (width, height);
        self.container.set_size(width, height);
        for name in &self.layer_names {
            if let Some(layer) = self.canvas.get_layer(name) {
                layer.set_size(width, height);
            }
        }
    }

    pub fn render(&self) {
        if !self.destroyed {
            self.canvas.render();
        }
    }

    pub fn request_render(&self) {
        if !self.destroyed {
            self.canvas.request_render();
        }
    }

    pub fn to_data_url(&self, options: &ExportOptions) -> StrataResult<String> {
        self.ensure_alive()?;
        self.canvas.to_data_url(options)
    }

    pub async fn to_blob(&self, options: &ExportOptions) -> StrataResult<Blob> {
        self.ensure_alive()?;
        self.canvas.to_blob(options).await
    }

    /// Cancel any pending frame, detach and drop every layer. Later calls do nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.canvas.cancel_render();

        for name in &self.layer_names {
            if self.canvas.delete_layer(name).is_some() {
                self.container.detach_surface(name);
            }
        }
        self.handles.clear();
        tracing::debug!("scene destroyed");
    }

    fn ensure_alive(&self) -> StrataResult<()> {
        if self.destroyed {
            return Err(StrataError::state("Scene is destroyed"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/lifecycle.rs"]
mod tests;
