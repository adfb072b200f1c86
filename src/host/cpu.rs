//! Software surface backed by `vello_cpu`.
//!
//! Drawing calls accumulate in a pending `vello_cpu::RenderContext`; the batch is rasterized and
//! blended source-over onto the committed pixels whenever pixels are observed (`read_pixels`,
//! `encode`) or edited directly (`clear_rect`). Paths are kept in device space: points pass through
//! the current transform as they are added, like a browser 2D context.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;
use std::sync::Arc;

use kurbo::Shape as _;

use crate::foundation::color::ColorDef;
use crate::foundation::core::{Affine, BezPath, FrameRGBA, Point, Rect, Vec2};
use crate::foundation::error::{StrataError, StrataResult};
use crate::host::composite::over_in_place;
use crate::host::encode::{ImageFormat, encode_frame};
use crate::host::surface::{
    Direction, DrawContext, ImageData, ImageSource, Surface, TextAlign, TextBaseline,
};
use crate::host::text::{FontLibrary, FontSpec};

const PATH_TOLERANCE: f64 = 0.1;
const MITER_LIMIT: f64 = 10.0;

#[derive(Clone, Debug)]
struct DrawState {
    transform: Affine,
    global_alpha: f64,
    fill: ColorDef,
    stroke: ColorDef,
    line_width: f64,
    font: FontSpec,
    text_align: TextAlign,
    text_baseline: TextBaseline,
    direction: Direction,
    image_smoothing: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        let black = ColorDef::rgba(0.0, 0.0, 0.0, 1.0);
        Self {
            transform: Affine::IDENTITY,
            global_alpha: 1.0,
            fill: black,
            stroke: black,
            line_width: 1.0,
            font: FontSpec::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
            direction: Direction::default(),
            image_smoothing: true,
        }
    }
}

pub struct CpuSurface {
    width: u32,
    height: u32,
    display: (f64, f64),
    pixels: Vec<u8>,
    pending: Option<vello_cpu::RenderContext>,
    state: DrawState,
    stack: Vec<DrawState>,
    path: BezPath,
    has_current_point: bool,
    fonts: Rc<RefCell<FontLibrary>>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("display", &self.display)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl CpuSurface {
    /// A 0×0 surface; size it with [`Surface::set_pixel_size`].
    pub fn new(fonts: Rc<RefCell<FontLibrary>>) -> Self {
        Self {
            width: 0,
            height: 0,
            display: (0.0, 0.0),
            pixels: Vec::new(),
            pending: None,
            state: DrawState::default(),
            stack: Vec::new(),
            path: BezPath::new(),
            has_current_point: false,
            fonts,
        }
    }

    fn pending(&mut self) -> Option<&mut vello_cpu::RenderContext> {
        let w = u16::try_from(self.width).ok()?;
        let h = u16::try_from(self.height).ok()?;
        if w == 0 || h == 0 {
            return None;
        }
        let ctx = self
            .pending
            .get_or_insert_with(|| vello_cpu::RenderContext::new(w, h));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Some(ctx)
    }

    fn commit(&mut self) {
        let Some(mut ctx) = self.pending.take() else {
            return;
        };
        let (Ok(w), Ok(h)) = (u16::try_from(self.width), u16::try_from(self.height)) else {
            return;
        };
        let mut scratch = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut scratch);
        if let Err(err) = over_in_place(&mut self.pixels, scratch.data_as_u8_slice(), 1.0) {
            tracing::warn!(error = %err, "dropping pending drawing");
        }
    }

    fn paint_color(&self, color: ColorDef) -> vello_cpu::peniko::Color {
        let c = ColorDef {
            a: color.a * self.state.global_alpha,
            ..color
        };
        let [r, g, b, a] = c.to_rgba8();
        vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
    }

    fn fill_device_path(&mut self, path: &BezPath) {
        let color = self.paint_color(self.state.fill);
        let path = bezpath_to_cpu(path);
        if let Some(ctx) = self.pending() {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color);
            ctx.fill_path(&path);
        }
    }

    // The pen follows the current transform: the device path is mapped back to user space,
    // stroked there and transformed again, so non-uniform scales widen strokes per axis.
    fn stroke_device_path(&mut self, path: &BezPath) {
        let width = self.state.line_width;
        let transform = self.state.transform;
        let det = transform.determinant();
        if width.is_nan() || width <= 0.0 || !det.is_finite() || det == 0.0 {
            return;
        }
        let color = self.paint_color(self.state.stroke);
        let path = bezpath_to_cpu(&(transform.inverse() * path.clone()));
        if let Some(ctx) = self.pending() {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_stroke(canvas_stroke(width));
            ctx.set_paint(color);
            ctx.stroke_path(&path);
        }
    }

    fn rect_path(&self, x: f64, y: f64, width: f64, height: f64) -> BezPath {
        self.state.transform * Rect::new(x, y, x + width, y + height).to_path(PATH_TOLERANCE)
    }

    fn push_point(&mut self, p: Point) {
        let p = self.state.transform * p;
        if self.has_current_point {
            self.path.line_to(p);
        } else {
            self.path.move_to(p);
            self.has_current_point = true;
        }
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>, stroke: bool) {
        if let Some(mw) = max_width
            && (mw.is_nan() || mw <= 0.0)
        {
            return;
        }
        let shaped = match self.fonts.borrow_mut().shape(text, &self.state.font) {
            Ok(shaped) => shaped,
            Err(err) => {
                tracing::warn!(error = %err, "skipping text draw");
                return;
            }
        };
        if shaped.glyphs.is_empty() {
            return;
        }

        let squeeze = match max_width {
            Some(mw) if shaped.width > mw => mw / shaped.width,
            _ => 1.0,
        };
        let width = shaped.width * squeeze;
        let rtl = self.state.direction == Direction::Rtl;
        let dx = match self.state.text_align {
            TextAlign::Left => 0.0,
            TextAlign::Right => -width,
            TextAlign::Center => -width / 2.0,
            TextAlign::Start if rtl => -width,
            TextAlign::Start => 0.0,
            TextAlign::End if rtl => 0.0,
            TextAlign::End => -width,
        };
        let dy = match self.state.text_baseline {
            TextBaseline::Alphabetic => 0.0,
            TextBaseline::Top | TextBaseline::Hanging => shaped.ascent,
            TextBaseline::Middle => (shaped.ascent - shaped.descent) / 2.0,
            TextBaseline::Ideographic | TextBaseline::Bottom => -shaped.descent,
        };

        let transform = self.state.transform
            * Affine::translate((x + dx, y + dy))
            * Affine::scale_non_uniform(squeeze, 1.0);
        let color = self.paint_color(if stroke {
            self.state.stroke
        } else {
            self.state.fill
        });
        let line_width = self.state.line_width;
        let Some(ctx) = self.pending() else {
            return;
        };
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(color);
        if stroke {
            ctx.set_stroke(canvas_stroke(line_width));
            ctx.glyph_run(&shaped.font)
                .font_size(shaped.font_size)
                .stroke_glyphs(shaped.glyphs.into_iter());
        } else {
            ctx.glyph_run(&shaped.font)
                .font_size(shaped.font_size)
                .fill_glyphs(shaped.glyphs.into_iter());
        }
    }
}

impl DrawContext for CpuSurface {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn global_alpha(&self) -> f64 {
        self.state.global_alpha
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        if (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha;
        }
    }

    fn set_fill_style(&mut self, color: &str) {
        match ColorDef::parse(color) {
            Ok(c) => self.state.fill = c,
            Err(err) => tracing::debug!(error = %err, "ignoring fill style"),
        }
    }

    fn set_stroke_style(&mut self, color: &str) {
        match ColorDef::parse(color) {
            Ok(c) => self.state.stroke = c,
            Err(err) => tracing::debug!(error = %err, "ignoring stroke style"),
        }
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn set_font(&mut self, font: &str) {
        match FontSpec::parse(font) {
            Ok(spec) => self.state.font = spec,
            Err(err) => tracing::debug!(error = %err, "ignoring font"),
        }
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    fn set_direction(&mut self, direction: Direction) {
        self.state.direction = direction;
    }

    fn set_image_smoothing_enabled(&mut self, enabled: bool) {
        self.state.image_smoothing = enabled;
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.state.transform *= Affine::translate((x, y));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.state.transform *= Affine::scale_non_uniform(x, y);
    }

    fn rotate(&mut self, angle: f64) {
        self.state.transform *= Affine::rotate(angle);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commit();
        let bbox = self
            .state
            .transform
            .transform_rect_bbox(Rect::new(x, y, x + width, y + height));
        let clamp = |v: f64, max: u32| v.round().clamp(0.0, f64::from(max)) as usize;
        let (x0, x1) = (clamp(bbox.x0, self.width), clamp(bbox.x1, self.width));
        let (y0, y1) = (clamp(bbox.y0, self.height), clamp(bbox.y1, self.height));
        let stride = self.width as usize * 4;
        for row in y0..y1 {
            self.pixels[row * stride + x0 * 4..row * stride + x1 * 4].fill(0);
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let path = self.rect_path(x, y, width, height);
        self.fill_device_path(&path);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let path = self.rect_path(x, y, width, height);
        self.stroke_device_path(&path);
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
        self.has_current_point = false;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to(self.state.transform * Point::new(x, y));
        self.has_current_point = true;
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push_point(Point::new(x, y));
    }

    fn close_path(&mut self) {
        if self.has_current_point {
            self.path.close_path();
        }
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, counterclockwise: bool) {
        self.ellipse(x, y, radius, radius, 0.0, start, end, counterclockwise);
    }

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
    ) {
        if radius_x.is_nan() || radius_y.is_nan() || radius_x < 0.0 || radius_y < 0.0 {
            return;
        }
        let sweep = arc_sweep(start, end, counterclockwise);
        let center = Point::new(x, y);
        let radii = Vec2::new(radius_x, radius_y);
        let first = center
            + (Affine::rotate(rotation)
                * Point::new(radius_x * start.cos(), radius_y * start.sin()))
            .to_vec2();
        self.push_point(first);

        let arc = kurbo::Arc::new(center, radii, start, sweep, rotation);
        let transform = self.state.transform;
        for el in arc.append_iter(PATH_TOLERANCE) {
            self.path.push(transform * el);
        }
    }

    fn fill(&mut self) {
        let path = self.path.clone();
        self.fill_device_path(&path);
    }

    fn stroke(&mut self) {
        let path = self.path.clone();
        self.stroke_device_path(&path);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.draw_text(text, x, y, max_width, false);
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.draw_text(text, x, y, max_width, true);
    }

    fn draw_image(&mut self, source: ImageSource<'_>, src: Rect, dst: Rect) {
        let image = match source {
            ImageSource::Image(img) => img.clone(),
            ImageSource::Surface(surface) => ImageData::from(surface.read_pixels()),
        };
        let (src, dst) = (src.abs(), dst.abs());
        if image.width == 0 || image.height == 0 || src.area() <= 0.0 || dst.area() <= 0.0 {
            return;
        }

        let sx = dst.width() / src.width();
        let sy = dst.height() / src.height();
        let clipped = src.intersect(Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        if clipped.area() <= 0.0 {
            return;
        }
        let dst = Rect::new(
            dst.x0 + (clipped.x0 - src.x0) * sx,
            dst.y0 + (clipped.y0 - src.y0) * sy,
            dst.x0 + (clipped.x1 - src.x0) * sx,
            dst.y0 + (clipped.y1 - src.y0) * sy,
        );

        let pixmap =
            match image_premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height) {
                Ok(p) => p,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping image draw");
                    return;
                }
            };
        let mut sampler = vello_cpu::peniko::ImageSampler::default();
        if !self.state.image_smoothing {
            sampler.quality = vello_cpu::peniko::ImageQuality::Low;
        }
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler,
        };
        let paint_transform = Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate((-clipped.x0, -clipped.y0));

        let transform = self.state.transform;
        let alpha = self.state.global_alpha;
        let Some(ctx) = self.pending() else {
            return;
        };
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint_transform(affine_to_cpu(paint_transform));
        ctx.set_paint(paint);
        if alpha < 1.0 {
            ctx.push_opacity_layer(alpha as f32);
        }
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(dst.x0, dst.y0, dst.x1, dst.y1));
        if alpha < 1.0 {
            ctx.pop_layer();
        }
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

impl Surface for CpuSurface {
    fn pixel_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_pixel_size(&mut self, width: u32, height: u32) {
        self.pending = None;
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
        self.state = DrawState::default();
        self.stack.clear();
        self.begin_path();
    }

    fn display_size(&self) -> (f64, f64) {
        self.display
    }

    fn set_display_size(&mut self, width: f64, height: f64) {
        self.display = (width, height);
    }

    fn context_2d(&mut self) -> Option<&mut dyn DrawContext> {
        Some(self)
    }

    fn read_pixels(&mut self) -> FrameRGBA {
        self.commit();
        FrameRGBA {
            width: self.width,
            height: self.height,
            data: self.pixels.clone(),
            premultiplied: true,
        }
    }

    fn encode(&mut self, format: ImageFormat, quality: Option<f64>) -> Option<Vec<u8>> {
        let frame = self.read_pixels();
        match encode_frame(&frame, format, quality) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(error = %err, format = format.mime(), "surface encode failed");
                None
            }
        }
    }
}

fn arc_sweep(start: f64, end: f64, counterclockwise: bool) -> f64 {
    if !counterclockwise && end - start >= TAU {
        return TAU;
    }
    if counterclockwise && start - end >= TAU {
        return -TAU;
    }
    let mut sweep = (end - start) % TAU;
    if !counterclockwise && sweep < 0.0 {
        sweep += TAU;
    } else if counterclockwise && sweep > 0.0 {
        sweep -= TAU;
    }
    sweep
}

/// 2D-canvas pen defaults: butt caps, miter joins, miter limit 10.
fn canvas_stroke(width: f64) -> vello_cpu::kurbo::Stroke {
    vello_cpu::kurbo::Stroke::new(width)
        .with_caps(vello_cpu::kurbo::Cap::Butt)
        .with_join(vello_cpu::kurbo::Join::Miter)
        .with_miter_limit(MITER_LIMIT)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StrataResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StrataError::resource("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StrataError::resource("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StrataError::resource("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/host/cpu.rs"]
mod tests;
