//! In-process host: CPU surfaces, a manually pumped frame clock and task queue.
//!
//! Nothing happens on its own. `run_frame` plays the role of one display refresh tick and
//! `run_pending_tasks` drains resource loads, so tests and offline renderers decide exactly when
//! callbacks fire.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::foundation::error::StrataError;
use crate::host::cpu::CpuSurface;
use crate::host::decode;
use crate::host::platform::{Container, FontLoaded, FrameCallback, FrameHandle, Host, ImageLoaded};
use crate::host::surface::Surface;
use crate::host::text::{FontLibrary, FontSpec};

type Task = Box<dyn FnOnce()>;

pub struct HeadlessHost {
    device_pixel_ratio: Cell<f64>,
    next_frame: Cell<u64>,
    frames: RefCell<Vec<(FrameHandle, FrameCallback)>>,
    tasks: RefCell<VecDeque<Task>>,
    fonts: Rc<RefCell<FontLibrary>>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("device_pixel_ratio", &self.device_pixel_ratio.get())
            .field("pending_frames", &self.pending_frames())
            .field("pending_tasks", &self.tasks.borrow().len())
            .finish()
    }
}

impl HeadlessHost {
    /// Host backed by the system font database (scanned on first text use).
    pub fn new() -> Self {
        Self::with_fonts(FontLibrary::with_system_fonts())
    }

    pub fn with_fonts(fonts: FontLibrary) -> Self {
        Self {
            device_pixel_ratio: Cell::new(1.0),
            next_frame: Cell::new(1),
            frames: RefCell::new(Vec::new()),
            tasks: RefCell::new(VecDeque::new()),
            fonts: Rc::new(RefCell::new(fonts)),
        }
    }

    pub fn with_device_pixel_ratio(self, ratio: f64) -> Self {
        self.device_pixel_ratio.set(ratio);
        self
    }

    pub fn set_device_pixel_ratio(&self, ratio: f64) {
        self.device_pixel_ratio.set(ratio);
    }

    pub fn fonts(&self) -> Rc<RefCell<FontLibrary>> {
        Rc::clone(&self.fonts)
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Fire every frame callback requested before this call. Frames requested from inside a
    /// callback wait for the next tick. Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let due = std::mem::take(&mut *self.frames.borrow_mut());
        let n = due.len();
        for (handle, callback) in due {
            tracing::trace!(frame = handle.0, "frame tick");
            callback();
        }
        n
    }

    /// Run queued tasks until the queue is empty, including tasks queued while draining.
    pub fn run_pending_tasks(&self) -> usize {
        let mut n = 0;
        loop {
            let Some(task) = self.tasks.borrow_mut().pop_front() else {
                break;
            };
            task();
            n += 1;
        }
        n
    }

    fn enqueue(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

impl Host for HeadlessHost {
    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.get()
    }

    fn create_surface(&self) -> Box<dyn Surface> {
        Box::new(CpuSurface::new(Rc::clone(&self.fonts)))
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_frame.get());
        self.next_frame.set(handle.0 + 1);
        self.frames.borrow_mut().push((handle, callback));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.frames.borrow_mut().retain(|(h, _)| *h != handle);
    }

    fn load_image(&self, src: &str, done: ImageLoaded) {
        let src = src.to_owned();
        self.enqueue(Box::new(move || done(decode::load_image(&src))));
    }

    fn load_font(&self, descriptor: &str, done: FontLoaded) {
        let descriptor = descriptor.to_owned();
        let fonts = Rc::clone(&self.fonts);
        self.enqueue(Box::new(move || {
            let result = FontSpec::parse(&descriptor).and_then(|spec| {
                fonts
                    .borrow_mut()
                    .resolve(&spec)
                    .map(|_| ())
                    .ok_or_else(|| {
                        StrataError::resource(format!("no font face matches \"{descriptor}\""))
                    })
            });
            done(result);
        }));
    }
}

/// What a [`HeadlessContainer`] has been told.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContainerState {
    pub size: (f64, f64),
    pub background: String,
    /// Attached surface names with their stacking index, in attach order.
    pub surfaces: Vec<(String, usize)>,
    pub detached: Vec<String>,
}

/// Container that only records what it is asked to do. Clones share state, so a caller can keep
/// one to inspect after handing another to a scene.
#[derive(Clone, Debug, Default)]
pub struct HeadlessContainer {
    state: Rc<RefCell<ContainerState>>,
}

impl HeadlessContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ContainerState {
        self.state.borrow().clone()
    }
}

impl Container for HeadlessContainer {
    fn set_size(&mut self, width: f64, height: f64) {
        self.state.borrow_mut().size = (width, height);
    }

    fn set_background(&mut self, background: &str) {
        self.state.borrow_mut().background = background.to_owned();
    }

    fn attach_surface(&mut self, name: &str, z_index: usize) {
        let mut state = self.state.borrow_mut();
        state.surfaces.retain(|(n, _)| n != name);
        state.surfaces.push((name.to_owned(), z_index));
    }

    fn detach_surface(&mut self, name: &str) {
        let mut state = self.state.borrow_mut();
        state.surfaces.retain(|(n, _)| n != name);
        state.detached.push(name.to_owned());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/headless.rs"]
mod tests;
