//! Image sources for the headless host: `data:` URIs and file paths.

use std::sync::Arc;

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{StrataError, StrataResult};
use crate::host::composite::premultiply_in_place;
use crate::host::surface::ImageData;

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StrataResult<ImageData> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_in_place(&mut rgba8_premul);

    Ok(ImageData {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Resolve `src` to encoded bytes. Remote URLs are not fetched.
pub fn read_source(src: &str) -> StrataResult<Vec<u8>> {
    if let Some(rest) = src.strip_prefix("data:") {
        return decode_data_uri(rest);
    }
    if src.starts_with("http://") || src.starts_with("https://") {
        return Err(StrataError::resource(format!(
            "remote image sources are not supported: \"{src}\""
        )));
    }
    let path = src.strip_prefix("file://").unwrap_or(src);
    let bytes = std::fs::read(path).with_context(|| format!("read image file \"{path}\""))?;
    Ok(bytes)
}

pub fn load_image(src: &str) -> StrataResult<ImageData> {
    let bytes = read_source(src)?;
    decode_image(&bytes)
}

fn decode_data_uri(rest: &str) -> StrataResult<Vec<u8>> {
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StrataError::resource("malformed data URI: missing ','"))?;
    if header.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .context("decode base64 data URI payload")?;
        Ok(bytes)
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/decode.rs"]
mod tests;
