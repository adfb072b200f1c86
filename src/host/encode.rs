//! Raster encoding for exports.

use std::io::Cursor;

use anyhow::Context;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{StrataError, StrataResult};
use crate::host::composite::unpremultiply_in_place;

/// JPEG quality used when none (or an out-of-range one) is requested.
pub const DEFAULT_JPEG_QUALITY: f64 = 0.92;

/// Export image type, named by MIME type in configuration. Unsupported types read as PNG.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ImageFormat {
    #[default]
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/webp")]
    Webp,
}

impl ImageFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ImageFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mime = String::deserialize(deserializer)?;
        Ok(Self::from_mime(&mime).unwrap_or_else(|| {
            tracing::debug!(mime = %mime, "unsupported export type, using image/png");
            Self::Png
        }))
    }
}

/// Encode premultiplied (or straight, per `frame.premultiplied`) pixels.
///
/// `quality` in `0..=1` only affects JPEG. JPEG has no alpha channel, so color is taken as if
/// composited over black.
pub fn encode_frame(
    frame: &FrameRGBA,
    format: ImageFormat,
    quality: Option<f64>,
) -> StrataResult<Vec<u8>> {
    if frame.width == 0 || frame.height == 0 {
        return Err(StrataError::export("cannot encode an empty surface"));
    }
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(StrataError::export(format!(
            "frame byte length mismatch: expected {expected}, got {}",
            frame.data.len()
        )));
    }

    let mut out = Vec::new();
    match format {
        ImageFormat::Png | ImageFormat::Webp => {
            let mut straight = frame.data.clone();
            if frame.premultiplied {
                unpremultiply_in_place(&mut straight);
            }
            let img = image::RgbaImage::from_raw(frame.width, frame.height, straight)
                .ok_or_else(|| StrataError::export("rgba buffer does not match dimensions"))?;
            let target = if format == ImageFormat::Png {
                image::ImageFormat::Png
            } else {
                image::ImageFormat::WebP
            };
            img.write_to(&mut Cursor::new(&mut out), target)
                .with_context(|| format!("encode {}", format.mime()))?;
        }
        ImageFormat::Jpeg => {
            let mut rgb = Vec::with_capacity(frame.width as usize * frame.height as usize * 3);
            for px in frame.data.chunks_exact(4) {
                if frame.premultiplied {
                    rgb.extend_from_slice(&px[..3]);
                } else {
                    let a = u16::from(px[3]);
                    rgb.extend(px[..3].iter().map(|&c| ((u16::from(c) * a + 127) / 255) as u8));
                }
            }
            let q = quality
                .filter(|q| q.is_finite() && (0.0..=1.0).contains(q))
                .unwrap_or(DEFAULT_JPEG_QUALITY);
            let q = ((q * 100.0).round() as u8).max(1);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, q);
            image::ImageEncoder::write_image(
                encoder,
                &rgb,
                frame.width,
                frame.height,
                image::ExtendedColorType::Rgb8,
            )
            .context("encode image/jpeg")?;
        }
    }
    Ok(out)
}

/// `data:<mime>;base64,<payload>`.
pub fn data_url(format: ImageFormat, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        format.mime(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// What a surface that cannot produce pixels reports as its data URL.
pub const EMPTY_DATA_URL: &str = "data:,";

#[cfg(test)]
#[path = "../../tests/unit/host/encode.rs"]
mod tests;
