//! Host services: surface creation, the frame scheduler, resource loaders and the container
//! element layer surfaces are attached to.

use crate::foundation::error::StrataResult;
use crate::host::surface::{ImageData, Surface};

/// Callback fired on the next display-refresh tick.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Completion of an image load. Invoked at most once.
pub type ImageLoaded = Box<dyn FnOnce(StrataResult<ImageData>)>;

/// Completion of a font readiness check. Invoked at most once.
pub type FontLoaded = Box<dyn FnOnce(StrataResult<()>)>;

/// Opaque id of a scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

pub trait Host {
    /// Device pixels per logical unit.
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    fn create_surface(&self) -> Box<dyn Surface>;

    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Cancel a pending frame. Unknown or already-fired handles are ignored.
    fn cancel_frame(&self, handle: FrameHandle);

    /// Start decoding `src` (a URL, file path or `data:` URI). `done` runs later, never inline
    /// with the call.
    fn load_image(&self, src: &str, done: ImageLoaded);

    /// Wait for the font described by a CSS font shorthand to become usable. `done` runs later,
    /// never inline with the call.
    fn load_font(&self, descriptor: &str, done: FontLoaded);
}

/// The element hosting a scene's layer surfaces.
pub trait Container {
    fn set_size(&mut self, width: f64, height: f64);
    fn set_background(&mut self, background: &str);
    /// Attach a named layer surface, stacked by `z_index` (registration order).
    fn attach_surface(&mut self, name: &str, z_index: usize);
    fn detach_surface(&mut self, name: &str);
}
