//! Drawing-surface contracts.
//!
//! A [`Surface`] is one raster backing store (a layer, an export target). Its [`DrawContext`] is an
//! immediate-mode 2D context with a save/restore state stack, the subset of operations layers and
//! shapes need. Everything here is single-threaded and object safe.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Affine, FrameRGBA, Rect};
use crate::host::encode::ImageFormat;

/// Decoded raster image, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl From<FrameRGBA> for ImageData {
    fn from(frame: FrameRGBA) -> Self {
        Self {
            width: frame.width,
            height: frame.height,
            rgba8_premul: Arc::new(frame.data),
        }
    }
}

/// Pixel source for [`DrawContext::draw_image`].
pub enum ImageSource<'a> {
    Image(&'a ImageData),
    /// Another surface; its current pixels are read back before blitting.
    Surface(&'a mut dyn Surface),
}

impl std::fmt::Debug for ImageSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image(img) => f
                .debug_struct("Image")
                .field("width", &img.width)
                .field("height", &img.height)
                .finish(),
            Self::Surface(s) => f
                .debug_struct("Surface")
                .field("pixel_size", &s.pixel_size())
                .finish(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Top,
    Hanging,
    Middle,
    #[default]
    Alphabetic,
    Ideographic,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
    #[default]
    Inherit,
}

/// Immediate-mode 2D drawing context.
///
/// Colors are CSS color strings. Angles are radians. Path construction and rectangle helpers are
/// interpreted through the current transform at the time they are issued.
pub trait DrawContext {
    fn save(&mut self);
    fn restore(&mut self);

    fn global_alpha(&self) -> f64;
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn set_direction(&mut self, direction: Direction);
    fn set_image_smoothing_enabled(&mut self, enabled: bool);

    fn translate(&mut self, x: f64, y: f64);
    fn scale(&mut self, x: f64, y: f64);
    fn rotate(&mut self, angle: f64);
    /// Replace the current transform. `Affine::IDENTITY` resets it.
    fn set_transform(&mut self, transform: Affine);

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, counterclockwise: bool);
    #[allow(clippy::too_many_arguments)]
    fn ellipse(
        &mut self,
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start: f64,
        end: f64,
        counterclockwise: bool,
    );
    fn fill(&mut self);
    fn stroke(&mut self);

    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>);
    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>);

    /// Blit `src` (source pixel space) into `dst` (user space).
    fn draw_image(&mut self, source: ImageSource<'_>, src: Rect, dst: Rect);
}

/// A raster drawing surface.
pub trait Surface {
    /// Backing store size in pixels.
    fn pixel_size(&self) -> (u32, u32);
    /// Resize the backing store. Content is cleared and context state reset.
    fn set_pixel_size(&mut self, width: u32, height: u32);
    /// Logical (CSS-like) display size.
    fn display_size(&self) -> (f64, f64);
    fn set_display_size(&mut self, width: f64, height: f64);

    /// The 2D context, if this surface can provide one.
    fn context_2d(&mut self) -> Option<&mut dyn DrawContext>;

    /// Current pixels, premultiplied RGBA8.
    fn read_pixels(&mut self) -> FrameRGBA;

    /// Encode current pixels. `None` means the encoder produced no data.
    fn encode(&mut self, format: ImageFormat, quality: Option<f64>) -> Option<Vec<u8>>;
}
