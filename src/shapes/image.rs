use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::foundation::core::{Meta, Rect};
use crate::host::platform::Host;
use crate::host::surface::{DrawContext, ImageData, ImageSource};
use crate::shapes::base::{ReadyCallback, Shape, ShapeParams, meta_object};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageParams {
    /// URL, file path or `data:` URI.
    pub src: String,
    pub x: f64,
    pub y: f64,
    /// Drawn width; the decoded natural width when unset (or zero).
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub opacity: f64,
    pub z_index: i32,
    #[serde(skip)]
    pub on_ready: Option<ReadyCallback>,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            src: String::new(),
            x: 0.0,
            y: 0.0,
            width: None,
            height: None,
            opacity: 1.0,
            z_index: 0,
            on_ready: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageStatus {
    Loading,
    Loaded,
    Error,
}

#[derive(Debug)]
struct ImageState {
    status: ImageStatus,
    image: Option<ImageData>,
}

/// A raster image that decodes asynchronously. Until the host delivers pixels it draws nothing;
/// a failed load is logged and leaves the shape permanently empty.
#[derive(Clone, Debug)]
pub struct ImageShape {
    params: ImageParams,
    state: Rc<RefCell<ImageState>>,
}

impl ImageShape {
    pub fn new(params: ImageParams, host: &dyn Host) -> Self {
        let state = Rc::new(RefCell::new(ImageState {
            status: ImageStatus::Loading,
            image: None,
        }));

        let loaded = Rc::clone(&state);
        let on_ready = params.on_ready.clone();
        let src = params.src.clone();
        host.load_image(
            &params.src,
            Box::new(move |result| match result {
                Ok(image) => {
                    {
                        let mut s = loaded.borrow_mut();
                        s.image = Some(image);
                        s.status = ImageStatus::Loaded;
                    }
                    if let Some(cb) = on_ready {
                        cb.call();
                    }
                }
                Err(err) => {
                    tracing::warn!(src = %src, error = %err, "failed to load image");
                    let mut s = loaded.borrow_mut();
                    s.image = None;
                    s.status = ImageStatus::Error;
                }
            }),
        );

        Self { params, state }
    }

    pub fn status(&self) -> ImageStatus {
        self.state.borrow().status
    }

    fn actual_size(&self, image: &ImageData) -> (f64, f64) {
        let pick = |explicit: Option<f64>, natural: u32| match explicit {
            Some(v) if v != 0.0 => v,
            _ => f64::from(natural),
        };
        (
            pick(self.params.width, image.width),
            pick(self.params.height, image.height),
        )
    }
}

impl Shape for ImageShape {
    fn draw(&self, ctx: &mut dyn DrawContext) {
        let state = self.state.borrow();
        let (ImageStatus::Loaded, Some(image)) = (state.status, state.image.as_ref()) else {
            return;
        };
        let (w, h) = self.actual_size(image);
        ctx.draw_image(
            ImageSource::Image(image),
            Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height)),
            Rect::new(
                self.params.x,
                self.params.y,
                self.params.x + w,
                self.params.y + h,
            ),
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
            "src": p.src,
            "x": p.x,
            "y": p.y,
            "width": p.width,
            "height": p.height,
        }))
    }
}
