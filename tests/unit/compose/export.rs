use super::*;
use crate::testing::{Call, RecordingHost, RecordingSurface, SurfacePlan};

#[test]
fn target_size_keeps_source_without_cap() {
    assert_eq!(target_size((200, 300), None), (200, 300));
    assert_eq!(target_size((200, 300), Some(0.0)), (200, 300));
    assert_eq!(target_size((200, 300), Some(-5.0)), (200, 300));
    assert_eq!(target_size((200, 300), Some(300.0)), (200, 300));
}

#[test]
fn target_size_downscales_longest_side() {
    assert_eq!(target_size((200, 300), Some(100.0)), (67, 100));
    assert_eq!(target_size((400, 100), Some(100.0)), (100, 25));
}

#[test]
fn target_size_never_below_one_pixel() {
    assert_eq!(target_size((1000, 1), Some(10.0)), (10, 1));
}

#[test]
fn options_deserialize_camel_case() {
    let opts: LayerExportOptions = serde_json::from_value(serde_json::json!({
        "type": "image/jpeg",
        "quality": 0.5,
        "maxSize": 64,
        "imageSmoothingEnabled": false,
        "applyOpacity": false,
    }))
    .unwrap();
    assert_eq!(opts.base.format, ImageFormat::Jpeg);
    assert_eq!(opts.base.quality, Some(0.5));
    assert_eq!(opts.base.max_size, Some(64.0));
    assert_eq!(opts.base.image_smoothing_enabled, Some(false));
    assert!(!opts.apply_opacity);

    let defaults: LayerExportOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults, LayerExportOptions::default());
    assert!(defaults.apply_opacity);
    assert_eq!(defaults.base.format, ImageFormat::Png);
}

#[test]
fn unsupported_export_type_falls_back_to_png() {
    let opts: ExportOptions =
        serde_json::from_value(serde_json::json!({ "type": "image/gif", "quality": 0.4 })).unwrap();
    assert_eq!(opts.format, ImageFormat::Png);
    assert_eq!(opts.quality, Some(0.4));
}

#[test]
fn export_surface_applies_smoothing_then_background() {
    let host = RecordingHost::new();
    let opts = ExportOptions {
        background: Some("white".into()),
        image_smoothing_enabled: Some(false),
        ..Default::default()
    };
    let surface = export_surface(&host, (4, 2), &opts, "no context").unwrap();
    assert_eq!(surface.pixel_size(), (4, 2));
    assert_eq!(
        host.surface_log(0),
        vec![
            Call::SetPixelSize(4, 2),
            Call::SetDisplaySize(4.0, 2.0),
            Call::ImageSmoothing(false),
            Call::Save,
            Call::GlobalAlpha(1.0),
            Call::FillStyle("white".into()),
            Call::FillRect(0.0, 0.0, 4.0, 2.0),
            Call::Restore,
        ]
    );
}

#[test]
fn export_surface_without_context_fails() {
    let host = RecordingHost::new();
    *host.plan.borrow_mut() = SurfacePlan::WithoutContext;
    let err = export_surface(&host, (1, 1), &ExportOptions::default(), "no context here")
        .err()
        .unwrap();
    assert!(err.to_string().contains("no context here"));
}

#[test]
fn data_url_falls_back_when_encoder_is_empty() {
    let opts = ExportOptions::default();
    let mut ok = RecordingSurface::new();
    assert_eq!(encode_data_url(&mut ok, &opts), "data:image/png;base64,ZW5jb2RlZA==");

    let mut empty = RecordingSurface::new().with_encoded(None);
    assert_eq!(encode_data_url(&mut empty, &opts), "data:,");
}

#[test]
fn blob_rejects_empty_encoder_output() {
    let opts = ExportOptions {
        format: ImageFormat::Webp,
        quality: Some(0.3),
        ..Default::default()
    };
    let mut ok = RecordingSurface::new();
    let blob = encode_blob(&mut ok, &opts, "canvas").unwrap();
    assert_eq!(blob.mime, "image/webp");
    assert_eq!(blob.bytes, b"encoded");
    assert_eq!(ok.calls(), vec![Call::Encode(ImageFormat::Webp, Some(0.3))]);

    let mut empty = RecordingSurface::new().with_encoded(None);
    let err = encode_blob(&mut empty, &opts, "canvas").unwrap_err();
    assert_eq!(
        err.to_string(),
        "export error: failed to export canvas: toBlob returned null"
    );
}
