use super::*;

fn frame_2x1() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 1,
        data: vec![255, 0, 0, 255, 0, 0, 128, 128],
        premultiplied: true,
    }
}

#[test]
fn png_round_trips_straight_alpha() {
    let bytes = encode_frame(&frame_2x1(), ImageFormat::Png, None).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255, 128]);
}

#[test]
fn jpeg_encodes_and_decodes_to_same_size() {
    let bytes = encode_frame(&frame_2x1(), ImageFormat::Jpeg, Some(0.5)).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (2, 1));
}

#[test]
fn empty_frames_are_rejected() {
    let f = FrameRGBA::transparent(0, 3);
    assert!(encode_frame(&f, ImageFormat::Png, None).is_err());
}

#[test]
fn mime_names_parse() {
    assert_eq!(ImageFormat::from_mime("image/jpeg"), Some(ImageFormat::Jpeg));
    assert_eq!(ImageFormat::from_mime("IMAGE/PNG"), Some(ImageFormat::Png));
    assert_eq!(ImageFormat::from_mime("image/gif"), None);
    assert_eq!(
        serde_json::from_str::<ImageFormat>("\"image/webp\"").unwrap(),
        ImageFormat::Webp
    );
}

#[test]
fn unsupported_mime_deserializes_as_png() {
    assert_eq!(
        serde_json::from_str::<ImageFormat>("\"image/gif\"").unwrap(),
        ImageFormat::Png
    );
    assert_eq!(
        serde_json::from_str::<ImageFormat>("\"image/jpg\"").unwrap(),
        ImageFormat::Jpeg
    );
    assert!(serde_json::from_str::<ImageFormat>("3").is_err());
}

#[test]
fn data_url_has_mime_and_base64_payload() {
    assert_eq!(data_url(ImageFormat::Png, b"abc"), "data:image/png;base64,YWJj");
}
