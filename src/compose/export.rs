//! Export policy shared by the compositor and single layers: downscaling, background fill,
//! smoothing and encoding.

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rect;
use crate::foundation::error::{StrataError, StrataResult};
use crate::host::encode::{EMPTY_DATA_URL, ImageFormat, data_url};
use crate::host::platform::Host;
use crate::host::surface::{DrawContext, ImageSource, Surface};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(rename = "type")]
    pub format: ImageFormat,
    /// `0..=1`, only meaningful for lossy formats.
    pub quality: Option<f64>,
    /// CSS color painted fully opaque under everything else.
    pub background: Option<String>,
    /// Longest side of the output, in pixels. Only ever shrinks.
    pub max_size: Option<f64>,
    /// Left at the surface default when unset.
    pub image_smoothing_enabled: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerExportOptions {
    #[serde(flatten)]
    pub base: ExportOptions,
    /// Multiply the export by the layer's own opacity.
    pub apply_opacity: bool,
}

impl Default for LayerExportOptions {
    fn default() -> Self {
        Self {
            base: ExportOptions::default(),
            apply_opacity: true,
        }
    }
}

impl From<ExportOptions> for LayerExportOptions {
    fn from(base: ExportOptions) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }
}

/// Encoded export result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Output size for a `source` raster under an optional `max_size` cap.
///
/// When the longer side exceeds a positive `max_size` both sides are scaled by
/// `max_size / longer_side` and rounded to the nearest pixel, never below 1.
pub fn target_size(source: (u32, u32), max_size: Option<f64>) -> (u32, u32) {
    let (sw, sh) = source;
    let Some(max_size) = max_size.filter(|m| m.is_finite() && *m > 0.0) else {
        return source;
    };
    let max_side = f64::from(sw.max(sh));
    if max_side <= max_size {
        return source;
    }
    let scale = max_size / max_side;
    let fit = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
    (fit(sw), fit(sh))
}

pub(crate) fn full_rect(size: (u32, u32)) -> Rect {
    Rect::new(0.0, 0.0, f64::from(size.0), f64::from(size.1))
}

/// Allocate an export surface of `size` pixels with smoothing and background applied.
pub(crate) fn export_surface(
    host: &dyn Host,
    size: (u32, u32),
    options: &ExportOptions,
    missing_context: &str,
) -> StrataResult<Box<dyn Surface>> {
    let mut surface = host.create_surface();
    surface.set_pixel_size(size.0, size.1);
    surface.set_display_size(f64::from(size.0), f64::from(size.1));

    let ctx = surface
        .context_2d()
        .ok_or_else(|| StrataError::construction(missing_context))?;
    if let Some(enabled) = options.image_smoothing_enabled {
        ctx.set_image_smoothing_enabled(enabled);
    }
    if let Some(background) = &options.background {
        ctx.save();
        ctx.set_global_alpha(1.0);
        ctx.set_fill_style(background);
        ctx.fill_rect(0.0, 0.0, f64::from(size.0), f64::from(size.1));
        ctx.restore();
    }
    Ok(surface)
}

/// Blit all of `source` (stretched from `src`) onto `ctx` at `alpha`, isolated by save/restore.
pub(crate) fn blit(
    ctx: &mut dyn DrawContext,
    source: &mut dyn Surface,
    alpha: f64,
    src: Rect,
    dst: Rect,
) {
    ctx.save();
    ctx.set_global_alpha(alpha);
    ctx.draw_image(ImageSource::Surface(source), src, dst);
    ctx.restore();
}

/// Data URL of `surface`, or `data:,` when the encoder produced nothing.
pub(crate) fn encode_data_url(surface: &mut dyn Surface, options: &ExportOptions) -> String {
    match surface.encode(options.format, options.quality) {
        Some(bytes) => data_url(options.format, &bytes),
        None => EMPTY_DATA_URL.to_owned(),
    }
}

pub(crate) fn encode_blob(
    surface: &mut dyn Surface,
    options: &ExportOptions,
    what: &str,
) -> StrataResult<Blob> {
    let bytes = surface
        .encode(options.format, options.quality)
        .ok_or_else(|| {
            StrataError::export(format!("failed to export {what}: toBlob returned null"))
        })?;
    Ok(Blob {
        mime: options.format.mime().to_owned(),
        bytes,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/export.rs"]
mod tests;
